//! Integration tests: full fetch → simulate → detect scans through the
//! public API, with mocked and file-backed match sources.

mod mock_source;
mod pipeline;
