//! Select-and-read file transfer

use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use eid_apdu_core::{Executor, ResultExt, StatusClass};
use tracing::{debug, instrument, trace};

use crate::commands::{read_binary, select_file};
use crate::constants::READ_BLOCK_SIZE;
use crate::{Error, Result};

/// Highest offset READ BINARY can address with P1 bit 8 cleared
const MAX_OFFSET: usize = 0x7FFF;

/// Read a whole transparent file
///
/// Selects `path`, waits `settle_delay`, then reads 255 byte blocks until the
/// card returns a short block or reports wrong parameters (end of file on a
/// block boundary). The card keeps one current-file cursor, so the caller must
/// hold the executor exclusively for the whole call.
#[instrument(level = "debug", skip_all, fields(path = %hex::encode_upper(path)))]
pub fn read_file<E: Executor + ?Sized>(
    executor: &mut E,
    path: &[u8],
    settle_delay: Duration,
) -> Result<Bytes> {
    let response = executor
        .transmit(&select_file(path))
        .context("SELECT FILE")?;
    if !response.is_success() {
        debug!(status = %response.status(), "SELECT FILE refused");
        return Err(Error::FileNotFound {
            path: hex::encode_upper(path),
            status: response.status(),
        });
    }

    if !settle_delay.is_zero() {
        thread::sleep(settle_delay);
    }

    let mut contents = BytesMut::new();
    loop {
        let offset = contents.len();
        if offset > MAX_OFFSET {
            return Err(Error::Protocol("file larger than READ BINARY can address"));
        }

        let response = executor
            .transmit(&read_binary(offset as u16))
            .with_context(|| format!("READ BINARY at offset {offset}"))?;
        match response.class() {
            StatusClass::Success => {
                let block = response.payload();
                trace!(offset, len = block.len(), "Read block");
                contents.extend_from_slice(block);
                if block.len() < READ_BLOCK_SIZE as usize {
                    break;
                }
            }
            StatusClass::WrongParameters => {
                trace!(offset, "End of file at block boundary");
                break;
            }
            _ => {
                return Err(Error::ReadBinary {
                    offset,
                    status: response.status(),
                });
            }
        }
    }

    debug!(len = contents.len(), "File read");
    Ok(contents.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eid_apdu_core::{CardExecutor, MockTransport, StatusWord, TransportError};
    use hex_literal::hex;

    fn executor(mock: MockTransport) -> CardExecutor<MockTransport> {
        CardExecutor::new(mock).with_resend_delay(Duration::ZERO)
    }

    fn file(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_chunked_read_reassembles_file() {
        let data = file(600);
        let mut executor = executor(
            MockTransport::new()
                .reply_status(0x9000)
                .reply_with(&data[..255], 0x9000)
                .reply_with(&data[255..510], 0x9000)
                .reply_with(&data[510..], 0x9000),
        );

        let contents = read_file(&mut executor, &hex!("3F00DF014031"), Duration::ZERO).unwrap();
        assert_eq!(contents.as_ref(), data.as_slice());

        let sent = executor.transport().apdus();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].as_ref(), hex!("00B00000FF"));
        assert_eq!(sent[2].as_ref(), hex!("00B000FFFF"));
        assert_eq!(sent[3].as_ref(), hex!("00B001FEFF"));
    }

    #[test]
    fn test_wrong_parameters_ends_file_on_boundary() {
        let data = file(510);
        let mut executor = executor(
            MockTransport::new()
                .reply_status(0x9000)
                .reply_with(&data[..255], 0x9000)
                .reply_with(&data[255..], 0x9000)
                .reply_status(0x6B00),
        );

        let contents = read_file(&mut executor, &hex!("3F00DF014033"), Duration::ZERO).unwrap();
        assert_eq!(contents.len(), 510);
    }

    #[test]
    fn test_select_failure_is_file_not_found() {
        let mut executor = executor(MockTransport::new().reply_status(0x6A82));
        let err = read_file(&mut executor, &hex!("3F00DF014039"), Duration::ZERO).unwrap_err();
        match err {
            Error::FileNotFound { path, status } => {
                assert_eq!(path, "3F00DF014039");
                assert_eq!(status, StatusWord::new(0x6A, 0x82));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(executor.transport().apdus().len(), 1);
    }

    #[test]
    fn test_other_status_during_read_is_an_error() {
        let mut executor = executor(
            MockTransport::new()
                .reply_status(0x9000)
                .reply_with(&file(255), 0x9000)
                .reply_status(0x6982),
        );

        let err = read_file(&mut executor, &hex!("3F00DF014035"), Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::ReadBinary { offset: 255, .. }));
    }

    #[test]
    fn test_transport_failure_names_the_read() {
        let mut executor = executor(
            MockTransport::new()
                .reply_status(0x9000)
                .reply_with(&file(255), 0x9000),
        );

        let err = read_file(&mut executor, &hex!("3F00DF014035"), Duration::ZERO).unwrap_err();
        match err {
            Error::Apdu(eid_apdu_core::Error::Context { context, source }) => {
                assert_eq!(context, "READ BINARY at offset 255");
                assert!(matches!(
                    *source,
                    eid_apdu_core::Error::Transport(TransportError::Transmission)
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_file() {
        let mut executor = executor(MockTransport::new().reply_status(0x9000).reply_status(0x9000));
        let contents = read_file(&mut executor, &hex!("3F00DF014035"), Duration::ZERO).unwrap();
        assert!(contents.is_empty());
    }
}
