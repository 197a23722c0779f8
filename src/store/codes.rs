use rand::Rng;

pub const DEFAULT_CODE_LENGTH: usize = 6;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate room codes. Candidates need not be unique; the room
/// registry retries until the database accepts one.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform draws from `A-Z0-9`, one per character, repeats allowed.
#[derive(Debug, Clone, Copy)]
pub struct RandomCodes {
    pub length: usize,
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self { length: DEFAULT_CODE_LENGTH }
    }
}

impl CodeGenerator for RandomCodes {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect()
    }
}

/// Codes are case-insensitive to whoever types them in.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
