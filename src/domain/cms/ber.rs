//! Minimal BER tree writer and reader.
//!
//! The writer builds a tree of nodes where every constructed node carries its
//! own `LengthForm`, so a caller can switch individual nodes to
//! indefinite-length encoding while everything else stays definite (DER).
//! The reader understands both forms and only single-byte tags, which covers
//! everything CMS SignedData uses.

use crate::domain::constants;
use crate::infra::error::{EsiaError, EsiaResult};

/// Length encoding of a constructed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthForm {
    Definite,
    Indefinite,
}

/// One node of a BER tree under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BerNode {
    Primitive {
        tag: u8,
        value: Vec<u8>,
    },
    Constructed {
        tag: u8,
        form: LengthForm,
        children: Vec<BerNode>,
    },
    /// A complete, already encoded TLV spliced in verbatim (certificates, names).
    Encoded(Vec<u8>),
}

/// Encode a definite length field: short form below 128, otherwise the
/// minimal big-endian long form.
#[must_use]
pub fn encode_length_bytes(length: usize) -> Vec<u8> {
    if length < 128 {
        return vec![length as u8];
    }
    let be = length.to_be_bytes();
    let skip = be.iter().take_while(|b| **b == 0).count();
    let octets = &be[skip..];
    let mut out = Vec::with_capacity(1 + octets.len());
    out.push(constants::DER_LONG_FORM_FLAG | octets.len() as u8);
    out.extend_from_slice(octets);
    out
}

impl BerNode {
    #[must_use]
    pub fn primitive(tag: u8, value: Vec<u8>) -> Self {
        BerNode::Primitive { tag, value }
    }

    #[must_use]
    pub fn constructed(tag: u8, children: Vec<BerNode>) -> Self {
        BerNode::Constructed {
            tag,
            form: LengthForm::Definite,
            children,
        }
    }

    #[must_use]
    pub fn encoded(der: Vec<u8>) -> Self {
        BerNode::Encoded(der)
    }

    #[must_use]
    pub fn sequence(children: Vec<BerNode>) -> Self {
        Self::constructed(constants::ASN1_SEQUENCE_TAG, children)
    }

    #[must_use]
    pub fn set(children: Vec<BerNode>) -> Self {
        Self::constructed(constants::ASN1_SET_TAG, children)
    }

    /// `[0]` constructed context-specific wrapper.
    #[must_use]
    pub fn context_0(children: Vec<BerNode>) -> Self {
        Self::constructed(constants::ASN1_CONTEXT_0_EXPLICIT_TAG, children)
    }

    /// OBJECT IDENTIFIER from its DER content bytes.
    #[must_use]
    pub fn oid(content: &[u8]) -> Self {
        Self::primitive(constants::ASN1_OID_TAG, content.to_vec())
    }

    #[must_use]
    pub fn octet_string(value: Vec<u8>) -> Self {
        Self::primitive(constants::ASN1_OCTET_STRING_TAG, value)
    }

    /// Builder-style length form override for constructed nodes.
    #[must_use]
    pub fn with_length_form(mut self, new_form: LengthForm) -> Self {
        if let BerNode::Constructed { form, .. } = &mut self {
            *form = new_form;
        }
        self
    }

    /// Set the length form of the node reached by following child indices
    /// from this node. An empty path addresses this node.
    pub fn set_length_form_at(&mut self, path: &[usize], new_form: LengthForm) -> EsiaResult<()> {
        match (path.split_first(), self) {
            (None, BerNode::Constructed { form, .. }) => {
                *form = new_form;
                Ok(())
            }
            (Some((&index, rest)), BerNode::Constructed { children, .. }) => children
                .get_mut(index)
                .ok_or_else(|| {
                    EsiaError::Asn1Error(format!("No child at index {index} in BER path"))
                })?
                .set_length_form_at(rest, new_form),
            _ => Err(EsiaError::Asn1Error(
                "Length form can only be set on constructed nodes".to_string(),
            )),
        }
    }

    /// Length form of the node at `path`, `None` if the path is invalid or
    /// does not address a constructed node.
    #[must_use]
    pub fn length_form_at(&self, path: &[usize]) -> Option<LengthForm> {
        match (path.split_first(), self) {
            (None, BerNode::Constructed { form, .. }) => Some(*form),
            (Some((&index, rest)), BerNode::Constructed { children, .. }) => {
                children.get(index)?.length_form_at(rest)
            }
            _ => None,
        }
    }

    /// Serialize this node and all descendants.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            BerNode::Primitive { tag, value } => {
                out.push(*tag);
                out.extend_from_slice(&encode_length_bytes(value.len()));
                out.extend_from_slice(value);
            }
            BerNode::Constructed {
                tag,
                form,
                children,
            } => {
                let mut body = Vec::new();
                for child in children {
                    child.encode_into(&mut body);
                }
                out.push(*tag);
                match form {
                    LengthForm::Definite => {
                        out.extend_from_slice(&encode_length_bytes(body.len()));
                        out.extend_from_slice(&body);
                    }
                    LengthForm::Indefinite => {
                        out.push(constants::BER_INDEFINITE_LENGTH);
                        out.extend_from_slice(&body);
                        out.extend_from_slice(constants::BER_END_OF_CONTENTS);
                    }
                }
            }
            BerNode::Encoded(der) => out.extend_from_slice(der),
        }
    }
}

/// One decoded TLV borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BerElement<'a> {
    pub tag: u8,
    pub form: LengthForm,
    /// Content octets (for indefinite form, excluding the end-of-contents marker).
    pub content: &'a [u8],
    /// The whole element including header and terminator.
    pub raw: &'a [u8],
}

impl<'a> BerElement<'a> {
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        self.tag & 0x20 != 0
    }

    /// Decode the direct children of a constructed element.
    pub fn children(&self) -> EsiaResult<Vec<BerElement<'a>>> {
        if !self.is_constructed() {
            return Err(EsiaError::Asn1Error(format!(
                "Element with tag 0x{:02X} is primitive",
                self.tag
            )));
        }
        let mut out = Vec::new();
        let mut rest = self.content;
        while !rest.is_empty() {
            let (child, tail) = read_element(rest)?;
            out.push(child);
            rest = tail;
        }
        Ok(out)
    }

    /// Child at `index`, or an error naming what was expected there.
    pub fn child(&self, index: usize, what: &str) -> EsiaResult<BerElement<'a>> {
        self.children()?
            .get(index)
            .copied()
            .ok_or_else(|| EsiaError::Asn1Error(format!("Missing {what}")))
    }

    /// Fail unless the element carries `tag`.
    pub fn expect_tag(self, tag: u8, what: &str) -> EsiaResult<Self> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(EsiaError::Asn1Error(format!(
                "Expected {what} (tag 0x{tag:02X}), found tag 0x{:02X}",
                self.tag
            )))
        }
    }
}

/// Read one element from the front of `data`, returning it and the remainder.
pub fn read_element(data: &[u8]) -> EsiaResult<(BerElement<'_>, &[u8])> {
    let (&tag, after_tag) = data
        .split_first()
        .ok_or_else(|| EsiaError::Asn1Error("Unexpected end of BER data".to_string()))?;
    if tag & 0x1F == 0x1F {
        return Err(EsiaError::Asn1Error(
            "Multi-byte BER tags are not supported".to_string(),
        ));
    }
    let (&first, after_len) = after_tag
        .split_first()
        .ok_or_else(|| EsiaError::Asn1Error("Missing BER length".to_string()))?;

    if first == constants::BER_INDEFINITE_LENGTH {
        if tag & 0x20 == 0 {
            return Err(EsiaError::Asn1Error(
                "Indefinite length on a primitive element".to_string(),
            ));
        }
        let mut rest = after_len;
        loop {
            if rest.starts_with(constants::BER_END_OF_CONTENTS) {
                let content_len = after_len.len() - rest.len();
                let total = 2 + content_len + constants::BER_END_OF_CONTENTS.len();
                let element = BerElement {
                    tag,
                    form: LengthForm::Indefinite,
                    content: &after_len[..content_len],
                    raw: &data[..total],
                };
                return Ok((element, &data[total..]));
            }
            if rest.is_empty() {
                return Err(EsiaError::Asn1Error(
                    "Missing end-of-contents marker".to_string(),
                ));
            }
            let (_, tail) = read_element(rest)?;
            rest = tail;
        }
    }

    let (header_len, length) = if first & 0x80 == 0 {
        (2usize, first as usize)
    } else {
        let count = (first & 0x7F) as usize;
        if count > std::mem::size_of::<usize>() || after_len.len() < count {
            return Err(EsiaError::Asn1Error(format!(
                "Unsupported or truncated BER length form: 0x{first:02X}"
            )));
        }
        let length = after_len[..count]
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (2 + count, length)
    };

    let total = header_len.checked_add(length).ok_or_else(|| {
        EsiaError::Asn1Error(format!("BER declared length {length} overflows"))
    })?;
    if data.len() < total {
        return Err(EsiaError::Asn1Error(format!(
            "BER declared length {} exceeds available {}",
            total,
            data.len()
        )));
    }
    let element = BerElement {
        tag,
        form: LengthForm::Definite,
        content: &data[header_len..total],
        raw: &data[..total],
    };
    Ok((element, &data[total..]))
}

/// Read exactly one element spanning the whole buffer.
pub fn read_single(data: &[u8]) -> EsiaResult<BerElement<'_>> {
    let (element, rest) = read_element(data)?;
    if !rest.is_empty() {
        return Err(EsiaError::Asn1Error(format!(
            "{} trailing bytes after BER element",
            rest.len()
        )));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_encoding() {
        assert_eq!(encode_length_bytes(127), vec![127]);
        assert_eq!(encode_length_bytes(128), vec![0x81, 128]);
        assert_eq!(encode_length_bytes(255), vec![0x81, 255]);
        assert_eq!(encode_length_bytes(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length_bytes(65535), vec![0x82, 0xFF, 0xFF]);
        assert_eq!(encode_length_bytes(65536), vec![0x83, 0x01, 0x00, 0x00]);
        assert_eq!(encode_length_bytes((1 << 24) - 1), vec![0x83, 0xFF, 0xFF, 0xFF]);
        assert_eq!(encode_length_bytes(1 << 24), vec![0x84, 0x01, 0x00, 0x00, 0x00]);
        assert_eq!(
            encode_length_bytes(0x1234_5678),
            vec![0x84, 0x12, 0x34, 0x56, 0x78]
        );
    }

    #[test]
    fn test_large_length_round_trips_through_reader() {
        let node = BerNode::octet_string(vec![0x5A; 1 << 24]);
        let encoded = node.encode();
        assert_eq!(&encoded[..6], &[0x04, 0x84, 0x01, 0x00, 0x00, 0x00]);

        let element = read_single(&encoded).unwrap();
        assert_eq!(element.content.len(), 1 << 24);
        assert_eq!(element.raw.len(), encoded.len());
    }

    #[test]
    fn test_selective_indefinite_encoding() {
        let mut tree = BerNode::sequence(vec![
            BerNode::oid(&[0x2a, 0x03]),
            BerNode::context_0(vec![BerNode::sequence(vec![BerNode::octet_string(
                b"hi".to_vec(),
            )])]),
        ]);
        tree.set_length_form_at(&[], LengthForm::Indefinite).unwrap();
        tree.set_length_form_at(&[1], LengthForm::Indefinite).unwrap();

        assert_eq!(
            tree.encode(),
            vec![
                0x30, 0x80, // outer, indefinite
                0x06, 0x02, 0x2a, 0x03, // oid
                0xa0, 0x80, // [0], indefinite
                0x30, 0x04, 0x04, 0x02, b'h', b'i', // definite inner
                0x00, 0x00, // end of [0]
                0x00, 0x00, // end of outer
            ]
        );
        assert_eq!(tree.length_form_at(&[1, 0]), Some(LengthForm::Definite));
        assert_eq!(tree.length_form_at(&[0]), None);
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let mut tree = BerNode::sequence(vec![BerNode::oid(&[0x2a])]);
        assert!(tree.set_length_form_at(&[3], LengthForm::Indefinite).is_err());
        assert!(tree.set_length_form_at(&[0], LengthForm::Indefinite).is_err());
    }

    #[test]
    fn test_reader_handles_nested_indefinite() {
        let bytes = [
            0x30, 0x80, 0xa0, 0x80, 0x04, 0x01, 0x07, 0x00, 0x00, 0x00, 0x00,
        ];
        let outer = read_single(&bytes).unwrap();
        assert_eq!(outer.form, LengthForm::Indefinite);
        assert_eq!(outer.raw.len(), bytes.len());

        let inner = outer.child(0, "[0]").unwrap();
        assert_eq!(inner.form, LengthForm::Indefinite);
        let leaf = inner.child(0, "octet string").unwrap();
        assert_eq!(leaf.form, LengthForm::Definite);
        assert_eq!(leaf.content, &[0x07]);
    }

    #[test]
    fn test_reader_rejects_truncated_input() {
        assert!(read_single(&[0x30, 0x80, 0x04, 0x01, 0x07]).is_err());
        assert!(read_single(&[0x04, 0x05, 0x01]).is_err());
        assert!(read_single(&[0x04, 0x01, 0x01, 0xff]).is_err());
    }
}
