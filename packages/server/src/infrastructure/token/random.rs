//! 英数字ランダムトークン生成器

use rand::{Rng, distributions::Alphanumeric};

use crate::domain::TokenGenerator;

/// スレッドローカルな CSPRNG から英数字を取り出してトークンを作る
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self, length: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}
