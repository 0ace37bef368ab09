pub mod buffer;
pub mod builder;
pub mod codec;
pub mod content_type;
pub mod headers;
pub mod parser;

pub use buffer::DecodeBuffer;
pub use builder::{MultipartBuilder, format_body};
pub use codec::FormDataCodec;
pub use content_type::{boundary_from_content_type, content_type_header};
pub use headers::{ContentDisposition, PartHeaders};
pub use parser::{DrainParts, MultipartParser, ParserState, Status};
