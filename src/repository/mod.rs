//! Repository acquisition and source extraction

mod extractor;
mod fetcher;

pub use extractor::{
    compile_ignore_pattern, file_header, CodeExtractor, ExtractError, ExtractedCode, ExtractionWarning, ExtractorConfig,
};
pub use fetcher::{ClonedRepository, FetchError, GitFetcher, RepositoryFetcher};
