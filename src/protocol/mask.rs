//! Payload masking for client-to-server frames.
//!
//! Clients XOR every payload byte with a rotating 4-byte key; applying the
//! same key again restores the original bytes, so one routine covers both
//! masking and unmasking. Server-to-client frames are never masked.

/// Byte-by-byte XOR masking.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// Word-at-a-time variant used on the frame parse path.
///
/// Processes 4 bytes per iteration via u32 XOR, then finishes the tail
/// byte-wise. Equivalent to [`apply_mask`].
#[inline]
pub fn apply_mask_words(data: &mut [u8], mask: [u8; 4]) {
    let mask_u32 = u32::from_ne_bytes(mask);
    let mut chunks = data.chunks_exact_mut(4);
    for chunk in &mut chunks {
        let val = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(val ^ mask_u32).to_ne_bytes());
    }
    for (i, byte) in chunks.into_remainder().iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking_reversible() {
        let mask = [0x12, 0x34, 0x56, 0x78];
        let original = b"Hello, WebSocket!".to_vec();
        let mut data = original.clone();

        apply_mask(&mut data, mask);
        assert_ne!(data, original);

        apply_mask(&mut data, mask);
        assert_eq!(data, original);
    }

    #[test]
    fn test_masking_example_from_rfc() {
        let mask = [0x37, 0xfa, 0x21, 0x3d];
        let mut data = b"Hello".to_vec();

        apply_mask(&mut data, mask);
        assert_eq!(data, vec![0x7f, 0x9f, 0x4d, 0x51, 0x58]);
    }

    #[test]
    fn test_masking_empty() {
        let mask = [0x12, 0x34, 0x56, 0x78];
        let mut data: Vec<u8> = vec![];
        apply_mask(&mut data, mask);
        assert_eq!(data, Vec::<u8>::new());
    }

    #[test]
    fn test_masking_single_byte() {
        let mask = [0xff, 0x00, 0x00, 0x00];
        let mut data = vec![0xaa];
        apply_mask(&mut data, mask);
        assert_eq!(data, vec![0x55]);
    }

    #[test]
    fn test_masking_words_equivalent() {
        let mask = [0xab, 0xcd, 0xef, 0x12];

        // Sizes straddling the 4-byte chunk boundary
        for size in [0, 1, 2, 3, 4, 5, 7, 8, 15, 16, 17, 63, 64, 65, 255, 1000] {
            let original: Vec<u8> = (0..size).map(|i| (i & 0xff) as u8).collect();

            let mut data_bytes = original.clone();
            let mut data_words = original.clone();

            apply_mask(&mut data_bytes, mask);
            apply_mask_words(&mut data_words, mask);

            assert_eq!(data_bytes, data_words, "mismatch at size {}", size);
        }
    }

    #[test]
    fn test_masking_words_reversible() {
        let mask = [0x12, 0x34, 0x56, 0x78];
        let original = b"A longer message spanning several 4-byte words.".to_vec();
        let mut data = original.clone();

        apply_mask_words(&mut data, mask);
        assert_ne!(data, original);

        apply_mask_words(&mut data, mask);
        assert_eq!(data, original);
    }
}
