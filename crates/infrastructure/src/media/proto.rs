//! `media.MediaService` 的线上报文定义
//!
//! 与媒体引擎约定的 proto 报文，手写等价于 tonic-build 的产物，
//! 避免引入 protoc 构建步骤。

/// 上传文件的元数据，必须作为流的第一条报文
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileMetadata {
    #[prost(string, tag = "1")]
    pub file_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub content_type: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub uploader_id: ::prost::alloc::string::String,
}

/// 客户端流式请求：元数据或数据块二选一
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileUploadRequest {
    #[prost(oneof = "file_upload_request::Request", tags = "1, 2")]
    pub request: ::core::option::Option<file_upload_request::Request>,
}

pub mod file_upload_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Metadata(super::FileMetadata),
        #[prost(bytes = "vec", tag = "2")]
        ChunkData(::prost::alloc::vec::Vec<u8>),
    }
}

/// 聚合响应：存储完成后的文件地址
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileUploadResponse {
    #[prost(string, tag = "1")]
    pub file_url: ::prost::alloc::string::String,
}

impl From<domain::UploadFrame> for FileUploadRequest {
    fn from(frame: domain::UploadFrame) -> Self {
        let request = match frame {
            domain::UploadFrame::Metadata(metadata) => {
                file_upload_request::Request::Metadata(FileMetadata {
                    file_name: metadata.file_name,
                    content_type: metadata.content_type,
                    uploader_id: metadata.uploader_id,
                })
            }
            domain::UploadFrame::Chunk(chunk) => {
                file_upload_request::Request::ChunkData(chunk.to_vec())
            }
        };
        Self {
            request: Some(request),
        }
    }
}
