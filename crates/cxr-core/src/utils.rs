//! 通用工具函数

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// 生成病例唯一标识符
pub fn generate_case_id() -> String {
    Uuid::new_v4().to_string()
}

/// 计算字节内容的SHA-256十六进制摘要
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_case_id() {
        let a = generate_case_id();
        let b = generate_case_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_sha256_hex() {
        // 已知向量
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex(b"").len(), 64);
    }
}
