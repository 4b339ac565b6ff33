// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Byte-capped body streaming
//!
//! Wraps a lazy stream of body chunks and enforces the byte cap while the
//! transfer is in flight. The wrapper stops polling the underlying stream as
//! soon as the running total would cross the cap; dropping it drops the
//! response, which closes the connection instead of draining it.

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::error::FetchError;

/// What to do when a chunk would push the body past the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Yield `FetchError::TooLarge` and end the stream
    Fail,
    /// Yield the part of the chunk that fits and end the stream
    Truncate,
}

/// Stream adapter enforcing a byte cap on body chunks
pub struct CappedBody<S> {
    inner: S,
    limit: usize,
    received: usize,
    overflow: Overflow,
    truncated: bool,
    done: bool,
}

impl<S, E> CappedBody<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<FetchError>,
{
    pub fn new(inner: S, limit: usize, overflow: Overflow) -> Self {
        Self {
            inner,
            limit,
            received: 0,
            overflow,
            truncated: false,
            done: false,
        }
    }

    /// Bytes accepted so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Drain the stream into a buffer, returning the bytes and the truncation flag
    pub async fn collect_bytes(mut self) -> Result<(Vec<u8>, bool), FetchError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok((buffer, self.truncated))
    }
}

impl<S, E> Stream for CappedBody<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<FetchError>,
{
    type Item = Result<Bytes, FetchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        let chunk = match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(None) => {
                self.done = true;
                return Poll::Ready(None);
            }
            Poll::Ready(Some(Err(err))) => {
                self.done = true;
                return Poll::Ready(Some(Err(err.into())));
            }
            Poll::Ready(Some(Ok(chunk))) => chunk,
        };

        let remaining = self.limit - self.received;
        if chunk.len() > remaining {
            self.done = true;
            return match self.overflow {
                Overflow::Fail => Poll::Ready(Some(Err(FetchError::TooLarge { limit: self.limit }))),
                Overflow::Truncate => {
                    self.truncated = true;
                    self.received = self.limit;
                    Poll::Ready(Some(Ok(chunk.slice(..remaining))))
                }
            };
        }

        self.received += chunk.len();
        Poll::Ready(Some(Ok(chunk)))
    }
}
