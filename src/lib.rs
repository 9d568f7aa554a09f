pub mod config;
pub mod data;
pub mod error;
pub mod index;
pub mod lemmatizer;
pub mod lexicon;
pub mod stream;
pub mod tagset;
pub mod token;

pub use config::Config;
pub use error::{Error, Result};
pub use index::RuleIndex;
pub use lemmatizer::{CasePolicy, Lemmatizer};
pub use lexicon::{Rule, RuleKind, RuleTable};
pub use stream::{StreamProcessor, StreamStats};
pub use tagset::{TagMatch, Tagset};
pub use token::{Record, ResolvedRecord};
