//! 媒体引擎 gRPC 客户端
//!
//! 一次 client-streaming 调用 `media.MediaService/UploadFile`：
//! 发送端按序提交全部帧并关闭，等待一个聚合响应。失败以调用
//! 错误形式出现，没有部分结果。

use async_trait::async_trait;
use domain::{FrameStream, MediaEngine, MediaError, StoredFile};
use futures_util::StreamExt;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

pub mod proto;

/// `media.MediaService` 客户端，形态与 tonic-build 生成物一致
#[derive(Debug, Clone)]
pub struct MediaServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl MediaServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    pub async fn upload_file(
        &mut self,
        request: impl tonic::IntoStreamingRequest<Message = proto::FileUploadRequest>,
    ) -> Result<tonic::Response<proto::FileUploadResponse>, tonic::Status> {
        let (metadata, extensions, stream) = request.into_streaming_request().into_parts();
        let stream: std::pin::Pin<
            Box<dyn futures_util::Stream<Item = proto::FileUploadRequest> + Send>,
        > = Box::pin(stream);
        let request = tonic::Request::from_parts(metadata, extensions, stream);
        self.inner
            .ready()
            .await
            .map_err(|err| tonic::Status::unknown(format!("service was not ready: {err}")))?;
        let codec: tonic::codec::ProstCodec<proto::FileUploadRequest, proto::FileUploadResponse> =
            tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/media.MediaService/UploadFile");
        self.inner.client_streaming(request, path, codec).await
    }
}

/// 基于 gRPC 通道的媒体引擎实现
pub struct GrpcMediaEngine {
    client: MediaServiceClient,
}

impl GrpcMediaEngine {
    /// 惰性建立通道：真正的连接在第一次调用时发生
    pub fn connect_lazy(endpoint: &str) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.to_string())?.connect_lazy();
        Ok(Self {
            client: MediaServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl MediaEngine for GrpcMediaEngine {
    async fn store(&self, frames: FrameStream) -> Result<StoredFile, MediaError> {
        let requests: std::pin::Pin<
            Box<dyn futures_util::Stream<Item = proto::FileUploadRequest> + Send>,
        > = Box::pin(frames.map(|frame| proto::FileUploadRequest::from(frame)));

        let mut client = self.client.clone();
        let response = client
            .upload_file(requests)
            .await
            .map_err(status_to_media_error)?;

        let url = response.into_inner().file_url;
        debug!(url = %url, "media engine completed upload stream");
        if url.is_empty() {
            return Err(MediaError::EmptyFileUrl);
        }
        Ok(StoredFile { url })
    }
}

fn status_to_media_error(status: tonic::Status) -> MediaError {
    match status.code() {
        tonic::Code::Unavailable | tonic::Code::Unknown => {
            MediaError::Unavailable(status.message().to_string())
        }
        code => MediaError::Rejected(format!("{code:?}: {}", status.message())),
    }
}
