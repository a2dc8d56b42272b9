//! Pure, synchronous text algorithms. No I/O, no async.

pub mod clustering;
pub mod keyphrase;
pub mod similarity;
pub mod tfidf;
pub mod timeline;
pub mod tokenizer;
