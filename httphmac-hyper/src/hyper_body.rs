use crate::error::HyperHmacResult;
use bytes::{Buf, Bytes};
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use httphmac::prelude::HmacAuthError;
use std::future::Future;

// Signing needs the whole body in memory to hash it, so streaming bodies are buffered first.

/* --------------------------------------- */
pub trait BufferedBody: http_body::Body {
  /// Returns the bytes object of the body
  fn into_bytes(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send
  where
    Self: Sized + Send,
    Self::Data: Send,
  {
    async {
      let mut body_buf = self.collect().await?.aggregate();
      Ok(body_buf.copy_to_bytes(body_buf.remaining()))
    }
  }
}

impl<T: ?Sized> BufferedBody for T where T: http_body::Body {}

/* --------------------------------------- */
/// A trait to buffer the body of a request so that it can be signed or verified
pub trait RequestBodyExt {
  /// Collect the body into memory. An unreadable body stream fails with `InvalidRequest`.
  fn into_buffered(self) -> impl Future<Output = HyperHmacResult<Request<Bytes>>> + Send
  where
    Self: Sized;

  #[cfg(feature = "blocking")]
  /// Synchronous counterpart of [`RequestBodyExt::into_buffered`].
  ///
  /// # Panics
  ///
  /// Panics if called from within an async runtime.
  fn into_buffered_sync(self) -> HyperHmacResult<Request<Bytes>>
  where
    Self: Sized,
  {
    futures::executor::block_on(self.into_buffered())
  }
}

/// A trait to buffer the body of a response so that it can be signed or verified
pub trait ResponseBodyExt {
  /// Collect the body into memory. An unreadable body stream fails with `InvalidRequest`.
  fn into_buffered(self) -> impl Future<Output = HyperHmacResult<Response<Bytes>>> + Send
  where
    Self: Sized;

  #[cfg(feature = "blocking")]
  /// Synchronous counterpart of [`ResponseBodyExt::into_buffered`].
  ///
  /// # Panics
  ///
  /// Panics if called from within an async runtime.
  fn into_buffered_sync(self) -> HyperHmacResult<Response<Bytes>>
  where
    Self: Sized,
  {
    futures::executor::block_on(self.into_buffered())
  }
}

impl<B> RequestBodyExt for Request<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: std::fmt::Display,
{
  async fn into_buffered(self) -> HyperHmacResult<Request<Bytes>>
  where
    Self: Sized,
  {
    let (parts, body) = self.into_parts();
    let body_bytes = body
      .into_bytes()
      .await
      .map_err(|e| HmacAuthError::InvalidRequest(format!("Failed to read request body: {e}")))?;
    Ok(Request::from_parts(parts, body_bytes))
  }
}

impl<B> ResponseBodyExt for Response<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
  <B as Body>::Error: std::fmt::Display,
{
  async fn into_buffered(self) -> HyperHmacResult<Response<Bytes>>
  where
    Self: Sized,
  {
    let (parts, body) = self.into_parts();
    let body_bytes = body
      .into_bytes()
      .await
      .map_err(|e| HmacAuthError::InvalidRequest(format!("Failed to read response body: {e}")))?;
    Ok(Response::from_parts(parts, body_bytes))
  }
}

/* --------------------------------------- */
#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::HyperHmacError;
  use http_body::Frame;
  use http_body_util::Full;
  use std::{
    pin::Pin,
    task::{Context, Poll},
  };

  /// Body whose stream breaks on the first read
  struct FailingBody;

  impl Body for FailingBody {
    type Data = Bytes;
    type Error = &'static str;

    fn poll_frame(
      self: Pin<&mut Self>,
      _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
      Poll::Ready(Some(Err("connection reset")))
    }
  }

  #[tokio::test]
  async fn buffer_request() {
    let body = Full::new(&b"{\"hello\": \"world\"}"[..]);
    let req = Request::builder()
      .method("POST")
      .uri("https://example.com/")
      .header("content-type", "application/json")
      .body(body)
      .unwrap();
    let req = req.into_buffered().await.unwrap();
    assert_eq!(req.body().as_ref(), b"{\"hello\": \"world\"}");
    assert_eq!(req.headers().get("content-type").unwrap(), "application/json");
  }

  #[tokio::test]
  async fn buffer_response() {
    let body = Full::new(Bytes::from_static(b"ok"));
    let res = Response::builder().status(200).body(body).unwrap();
    let res = res.into_buffered().await.unwrap();
    assert_eq!(res.body().as_ref(), b"ok");
    assert_eq!(res.status(), 200);
  }

  #[tokio::test]
  async fn unreadable_body_is_invalid_request() {
    let req = Request::builder().uri("/").body(FailingBody).unwrap();
    let res = req.into_buffered().await;
    assert!(matches!(
      res,
      Err(HyperHmacError::HmacAuthError(HmacAuthError::InvalidRequest(_)))
    ));
  }

  #[cfg(feature = "blocking")]
  #[test]
  fn buffer_request_sync() {
    let body = Full::new(Bytes::from_static(b"sync"));
    let req = Request::builder().uri("/").body(body).unwrap();
    let req = req.into_buffered_sync().unwrap();
    assert_eq!(req.body().as_ref(), b"sync");
  }
}
