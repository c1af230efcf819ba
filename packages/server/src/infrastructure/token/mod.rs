//! アクセストークン生成の実装

pub mod random;

pub use random::RandomTokenGenerator;
