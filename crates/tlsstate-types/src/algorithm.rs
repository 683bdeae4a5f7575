/// Hash algorithm identifiers used by the legacy TLS key schedule and record MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgId {
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgId {
    /// Digest output size in bytes.
    pub fn output_size(&self) -> usize {
        match self {
            HashAlgId::Md5 => 16,
            HashAlgId::Sha1 => 20,
            HashAlgId::Sha256 => 32,
        }
    }
}
