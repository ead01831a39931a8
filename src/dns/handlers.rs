use crate::dns::resolver::{Resolution, Resolver};
use crate::dns::response::{answer_header, nxdomain_header};
use crate::error::Error;
use tracing::{debug, error};
use trust_dns_proto::op::{Header, MessageType, OpCode, ResponseCode};
use trust_dns_proto::rr::Record;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

#[derive(Clone)]
pub struct Handler {
    resolver: Resolver,
}

impl Handler {
    pub(super) fn new(resolver: Resolver) -> Self {
        Handler { resolver }
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response: R,
    ) -> Result<ResponseInfo, Error> {
        // If it isn't a query, return NOTIMPL.
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            return self.handle_notimpl(request, response).await;
        }

        match self.resolver.resolve(request.query().original()).await {
            Resolution::Answer(record) => self.send_auth_resp(request, response, record).await,
            Resolution::NxDomain => self.send_nxdomain(request, response).await,
            Resolution::Drop => {
                debug!("dropping query {} from {}", request.id(), request.src());
                let mut header = Header::response_from_request(request.header());
                header.set_response_code(ResponseCode::ServFail);
                Ok(header.into())
            }
        }
    }

    async fn handle_notimpl<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let response = MessageResponseBuilder::from_message_request(request);
        Ok(response_handle
            .send_response(response.error_msg(request.header(), ResponseCode::NotImp))
            .await?)
    }

    async fn send_auth_resp<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        record: Record,
    ) -> Result<ResponseInfo, Error> {
        let header = answer_header(request.header());
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, [&record], &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    async fn send_nxdomain<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build_no_records(nxdomain_header(request.header()));
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
