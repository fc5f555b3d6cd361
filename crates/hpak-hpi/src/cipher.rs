//! Chunk payload obfuscation.
//!
//! Obfuscated chunks transform each byte with its index inside the chunk:
//! `encoded = (plain ^ i) + i`, so decoding is `plain = (encoded - i) ^ i`,
//! both modulo 256. The index restarts at zero for every chunk.

/// De-obfuscate a chunk payload in place.
pub fn deobfuscate_in_place(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        let k = i as u8;
        *byte = byte.wrapping_sub(k) ^ k;
    }
}

/// Obfuscate a chunk payload in place.
pub fn obfuscate_in_place(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        let k = i as u8;
        *byte = (*byte ^ k).wrapping_add(k);
    }
}

/// De-obfuscate to a new buffer.
pub fn deobfuscate(data: &[u8]) -> Vec<u8> {
    let mut buffer = data.to_vec();
    deobfuscate_in_place(&mut buffer);
    buffer
}
