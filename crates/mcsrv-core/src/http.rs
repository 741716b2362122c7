//! HTTP transport for catalog documents and artifact downloads.
//!
//! The pipeline only depends on the [`HttpSource`] trait; [`CurlSource`] is the
//! libcurl-backed implementation used by the binary. Both operations are
//! blocking and run on the calling thread.

use crate::config::McsrvConfig;
use std::fmt;
use std::io::Write;
use std::time::Duration;

/// Failure of a single HTTP transfer.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection refused, DNS, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the body into the caller's sink failed (e.g. disk full). The
    /// transfer is aborted when this happens.
    Sink(std::io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::Sink(e) => write!(f, "sink: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Sink(e) => Some(e),
            TransferError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}

/// Source of remote bytes: small documents via `get`, large bodies streamed via `download`.
pub trait HttpSource: Send + Sync {
    /// GET `url` and return the whole body.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransferError>;

    /// GET `url` and stream the body into `sink`. Returns the number of bytes written.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError>;
}

/// Timeouts applied to every libcurl easy handle.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer limit (artifact downloads can be large).
    pub timeout: Duration,
    /// Abort when throughput stays below this many bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

impl From<&McsrvConfig> for CurlOptions {
    fn from(cfg: &McsrvConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.transfer_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
        }
    }
}

/// libcurl-backed [`HttpSource`]. A fresh easy handle is used per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlSource {
    opts: CurlOptions,
}

impl CurlSource {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.opts.connect_timeout)?;
        easy.timeout(self.opts.timeout)?;
        easy.low_speed_limit(self.opts.low_speed_limit)?;
        easy.low_speed_time(self.opts.low_speed_time)?;
        Ok(easy)
    }
}

fn check_status(easy: &mut curl::easy::Easy) -> Result<(), TransferError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }
    Ok(())
}

impl HttpSource for CurlSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let mut body = Vec::new();
        let mut easy = self.easy(url)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(&mut easy)?;
        tracing::debug!(url, bytes = body.len(), "GET complete");
        Ok(body)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, TransferError> {
        let mut written: u64 = 0;
        let mut sink_err: Option<std::io::Error> = None;
        let mut easy = self.easy(url)?;
        // Error pages (404, 500) must never reach the sink: it is the artifact file.
        easy.fail_on_error(true)?;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    sink_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = sink_err {
            return Err(TransferError::Sink(e));
        }
        if let Err(e) = performed {
            if e.is_http_returned_error() {
                return Err(TransferError::Http(easy.response_code()?));
            }
            return Err(e.into());
        }
        check_status(&mut easy)?;
        tracing::debug!(url, bytes = written, "download complete");
        Ok(written)
    }
}
