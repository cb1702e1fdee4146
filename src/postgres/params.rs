use std::error::Error;

use tokio_postgres::types::{Format, IsNull, Kind, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::session::WireParam;
use crate::types::{Oid, ParamFormat, TYPE_UNKNOWN};

/// Parameter type for a prepared statement. Oid 0 leaves the choice to the server.
pub(crate) fn param_type(oid: Oid) -> Type {
    if oid == TYPE_UNKNOWN {
        return Type::new(
            "unspecified".to_string(),
            TYPE_UNKNOWN,
            Kind::Pseudo,
            "pg_catalog".to_string(),
        );
    }
    Type::from_oid(oid).unwrap_or_else(|| {
        Type::new(
            format!("oid_{oid}"),
            oid,
            Kind::Simple,
            "pg_catalog".to_string(),
        )
    })
}

// The bytes are already in wire form; the declared format tells the server how to read them.
impl ToSql for WireParam {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match &self.value {
            None => Ok(IsNull::Yes),
            Some(raw) => {
                out.extend_from_slice(raw);
                Ok(IsNull::No)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        match self.format {
            ParamFormat::Text => Format::Text,
            ParamFormat::Binary => Format::Binary,
        }
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn writes_bytes_verbatim() {
        let param = WireParam::text("35", oid::INT4);
        let mut out = bytes::BytesMut::new();
        let is_null = param.to_sql(&Type::INT4, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(&out[..], b"35");
        assert!(matches!(param.encode_format(&Type::INT4), Format::Text));

        let null = WireParam::null(oid::TEXT);
        assert!(matches!(null.to_sql(&Type::TEXT, &mut out).unwrap(), IsNull::Yes));
    }

    #[test]
    fn maps_oids_to_types() {
        assert_eq!(param_type(oid::INT8), Type::INT8);
        assert_eq!(param_type(oid::TIMESTAMPTZ), Type::TIMESTAMPTZ);
        assert_eq!(param_type(TYPE_UNKNOWN).oid(), 0);
        assert_eq!(param_type(99_999).oid(), 99_999);
    }
}
