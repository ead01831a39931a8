//! Reply headers and records. Nothing here touches the network or the address store.

use std::net::Ipv4Addr;
use trust_dns_proto::op::{Header, ResponseCode};
use trust_dns_proto::rr::{Name, RData, Record};

/// TTL of every answer, in seconds. Kept short since machines come and go with redeploys.
pub const ANSWER_TTL: u32 = 30;

/// The single `A` record answering a query for `name`.
#[must_use]
pub fn answer_record(name: Name, ip: Ipv4Addr) -> Record {
    Record::from_rdata(name, ANSWER_TTL, RData::A(ip))
}

/// Header for a positive, authoritative reply to a request with the given header.
#[must_use]
pub fn answer_header(request: &Header) -> Header {
    let mut header = Header::response_from_request(request);
    header.set_authoritative(true);
    header
}

/// Header for an authoritative "no such name" reply. It is sent without any records.
#[must_use]
pub fn nxdomain_header(request: &Header) -> Header {
    let mut header = answer_header(request);
    header.set_response_code(ResponseCode::NXDomain);
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use trust_dns_proto::op::{MessageType, OpCode};
    use trust_dns_proto::rr::{DNSClass, RecordType};

    fn request_header() -> Header {
        let mut header = Header::new();
        header
            .set_id(0xBEEF)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        header
    }

    #[test]
    fn answer_is_a_30s_a_record() {
        let name = Name::from_str("db1.myapp.ops.").unwrap();
        let record = answer_record(name.clone(), Ipv4Addr::new(10, 0, 0, 5));

        assert_eq!(record.name(), &name);
        assert_eq!(record.record_type(), RecordType::A);
        assert_eq!(record.dns_class(), DNSClass::IN);
        assert_eq!(record.ttl(), 30);
        assert_eq!(record.data(), Some(&RData::A(Ipv4Addr::new(10, 0, 0, 5))));
    }

    #[test]
    fn answer_header_echoes_request() {
        let header = answer_header(&request_header());

        assert_eq!(header.id(), 0xBEEF);
        assert_eq!(header.message_type(), MessageType::Response);
        assert_eq!(header.op_code(), OpCode::Query);
        assert!(header.recursion_desired());
        assert!(header.authoritative());
        assert_eq!(header.response_code(), ResponseCode::NoError);
    }

    #[test]
    fn nxdomain_header_is_authoritative() {
        let header = nxdomain_header(&request_header());

        assert_eq!(header.id(), 0xBEEF);
        assert_eq!(header.message_type(), MessageType::Response);
        assert!(header.authoritative());
        assert_eq!(header.response_code(), ResponseCode::NXDomain);
    }
}
