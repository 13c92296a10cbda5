use crate::err::*;
use mcx_syntax::{lifted as ls, packed::Json, *};

/// A resource body as a literal data tree. Boxes are transparent; anything
/// that needs running is rejected.
pub fn pack_json(term: &ls::Term) -> Result<Json> {
    let json = match &term.kind {
        | ls::TermKind::Lit(lit) => match lit {
            | Literal::Bool(value) => Json::Bool(*value),
            | Literal::Byte(value) => Json::Byte(*value),
            | Literal::Short(value) => Json::Short(*value),
            | Literal::Int(value) => Json::Int(*value),
            | Literal::Long(value) => Json::Long(*value),
            | Literal::Float(value) => Json::Float(*value),
            | Literal::Double(value) => Json::Double(*value),
            | Literal::String(value) => Json::String(value.clone()),
        },
        | ls::TermKind::Array(ArrayOf { elements, .. }) | ls::TermKind::List(ListOf(elements)) => {
            Json::Array(elements.iter().map(pack_json).collect::<Result<_>>()?)
        }
        | ls::TermKind::Compound(CompoundOf(elements)) => Json::Object(
            (elements.iter())
                .map(|(key, element)| Ok((key.clone(), pack_json(element)?)))
                .collect::<Result<_>>()?,
        ),
        | ls::TermKind::Ref(RefOf(element)) => pack_json(element)?,
        | _ => Err(PackError::Unsupported("a resource body that is not plain data".to_string()))?,
    };
    Ok(json)
}
