//! Runtime support for clients generated by `declient-gen`.
//!
//! Generated methods build a [`RequestSpec`] and hand it to an [`ApiClient`],
//! which owns URL resolution, query composition, header precedence, body
//! serialization and the three dispatch strategies (decoded value, raw bytes,
//! streamed file). Authentication, transport and body encoding are pluggable
//! through [`TokenProvider`], [`Transport`] and [`ContentSerializer`].

mod auth;
mod client;
mod download;
mod encoding;
mod error;
mod path;
mod query;
mod request;
mod serializer;
mod transport;

pub use async_trait::async_trait;
pub use auth::{StaticTokenProvider, TokenKind, TokenProvider};
pub use bytes::Bytes;
pub use client::ApiClient;
pub use download::COPY_BUFFER_SIZE;
pub use encoding::{PATH_ENCODE_SET, QUERY_ENCODE_SET, percent_encode_path_segment, percent_encode_query_component};
pub use error::{ApiError, FailureCategory};
pub use http::Method;
pub use path::{path_param, path_param_opt};
pub use query::{ArrayFormat, QueryPairs};
pub use request::RequestSpec;
pub use serializer::{ContentSerializer, JsonSerializer, is_json_content_type};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ReqwestTransport, Transport};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
