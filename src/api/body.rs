use reqwest::Response;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Body of a successful file download.
///
/// Server responses are streamed chunk by chunk into the writer, so large
/// videos are never held in memory as a whole.
#[derive(Debug)]
pub struct DownloadBody {
    source: Source,
}

#[derive(Debug)]
enum Source {
    Response(Response),
    Buffered(Vec<u8>),
}

impl DownloadBody {
    pub(crate) fn from_response(response: Response) -> Self {
        Self { source: Source::Response(response) }
    }

    /// Copy the whole body into `writer`, returning the number of bytes written
    pub async fn write_to<W>(self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written = 0u64;
        match self.source {
            Source::Response(mut response) => {
                while let Some(chunk) = response.chunk().await? {
                    writer.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
            }
            Source::Buffered(bytes) => {
                writer.write_all(&bytes).await?;
                written = bytes.len() as u64;
            }
        }
        writer.flush().await?;
        Ok(written)
    }
}

impl From<Vec<u8>> for DownloadBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self { source: Source::Buffered(bytes) }
    }
}
