mod articles;
mod cache;
mod classifier;
mod composer;
mod digest;
mod rewriter;

pub use articles::ArticleFetcher;
pub use cache::DecisionCache;
pub use classifier::QueryClassifier;
pub use composer::ResponseComposer;
pub use digest::DigestBuilder;
pub use rewriter::QueryRewriter;
