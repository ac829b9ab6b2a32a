//! Method-to-decoder dispatch.
//!
//! Archive readers hold one `Box<dyn Decoder>` per entry and never look at
//! which variant sits behind it.

use crate::config::DecoderConfig;
use crate::lh::LhDecoder;
use crate::lzs::LzsDecoder;
use crate::methods::LhaMethod;
use crate::pm2::Pm2Decoder;
use crate::stored::StoredDecoder;
use lharc_core::error::{LharcError, Result};
use lharc_core::source::ByteSource;
use lharc_core::traits::Decoder;

/// Create a decoder for `method` with the default configuration.
pub fn create_decoder<'a, S: ByteSource + 'a>(
    method: LhaMethod,
    source: S,
) -> Result<Box<dyn Decoder + 'a>> {
    create_decoder_with(method, source, DecoderConfig::default())
}

/// Create a decoder for `method`.
///
/// Fails with [`LharcError::UnsupportedMethod`] for recognised methods that
/// have no decoder, and [`LharcError::InvalidParameter`] for a bad config.
pub fn create_decoder_with<'a, S: ByteSource + 'a>(
    method: LhaMethod,
    source: S,
    config: DecoderConfig,
) -> Result<Box<dyn Decoder + 'a>> {
    config.validate()?;

    let decoder: Box<dyn Decoder + 'a> = match method {
        LhaMethod::Lh0 | LhaMethod::Lz4 | LhaMethod::Pm0 => {
            Box::new(StoredDecoder::new(source, config.input_chunk))
        }
        LhaMethod::Lzs => Box::new(LzsDecoder::new(source, config.input_chunk)),
        LhaMethod::Pm2 => Box::new(Pm2Decoder::with_config(source, config)),
        LhaMethod::Lh4 | LhaMethod::Lh5 | LhaMethod::Lh6 | LhaMethod::Lh7 => {
            Box::new(LhDecoder::with_config(method, source, config)?)
        }
        LhaMethod::Lh1 | LhaMethod::Lz5 | LhaMethod::Pm1 => {
            return Err(LharcError::unsupported_method(method.name()));
        }
    };

    log::debug!(
        "created {} decoder (history {} bytes, strict trees: {})",
        method,
        method.history_size(),
        config.strict_trees
    );
    Ok(decoder)
}

/// Create a decoder from a 5-byte method id such as `b"-pm2-"`.
pub fn create_decoder_by_id<'a, S: ByteSource + 'a>(
    id: &[u8],
    source: S,
) -> Result<Box<dyn Decoder + 'a>> {
    match LhaMethod::from_id(id) {
        Some(method) => create_decoder(method, source),
        None => Err(LharcError::unsupported_method(
            String::from_utf8_lossy(id).into_owned(),
        )),
    }
}
