//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod bulk_send;

pub use bulk_send::{
    decode_bulk_send_json_response, encode_bulk_send_body, provider_message_from_body,
};
