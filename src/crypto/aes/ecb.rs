use crate::crypto::aes::{ensure_aligned, to_block, Aes, BlockCipher, BLOCK_SIZE};
use crate::util::Result;

pub fn ecb_encrypt<C: BlockCipher + ?Sized>(cipher: &C, buf: &[u8]) -> Result<Vec<u8>> {
    ensure_aligned(buf)?;
    let blocks = buf.chunks_exact(BLOCK_SIZE)
        .map(|block| cipher.encrypt_block(to_block(block)) )
        .collect::<Result<Vec<_>>>()?;
    Ok(blocks.concat())
}

pub fn ecb_decrypt<C: BlockCipher + ?Sized>(cipher: &C, buf: &[u8]) -> Result<Vec<u8>> {
    ensure_aligned(buf)?;
    let blocks = buf.chunks_exact(BLOCK_SIZE)
        .map(|block| cipher.decrypt_block(to_block(block)) )
        .collect::<Result<Vec<_>>>()?;
    Ok(blocks.concat())
}

pub fn aes_ecb_encrypt(buf: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    ecb_encrypt(&Aes::new(key)?, buf)
}

pub fn aes_ecb_decrypt(buf: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    ecb_decrypt(&Aes::new(key)?, buf)
}
