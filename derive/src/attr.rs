//! `#[schema(...)]` and the subset of `#[serde(...)]` that affects naming.
use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Ident, Lit, LitStr, Result, Token, UnOp};

use crate::case::RenameRule;

const EXCLUDED: &str = "-";

/// `schema` keys that map one-to-one onto a `TagKey` variant.
const VALUE_KEYS: &[(&str, &str)] = &[
    ("description", "Description"),
    ("min_length", "MinLength"),
    ("max_length", "MaxLength"),
    ("pattern", "Pattern"),
    ("min", "Min"),
    ("max", "Max"),
    ("exclusive_min", "ExclusiveMin"),
    ("exclusive_max", "ExclusiveMax"),
    ("const", "Const"),
    ("enum", "Enum"),
];

#[derive(Debug, Default)]
pub(crate) struct MemberAttrs {
    schema_name: Option<String>,
    serde_name: Option<String>,
    /// `TagKey` variant and raw text, in attribute order.
    pub(crate) tags: Vec<(Ident, String)>,
}

impl MemberAttrs {
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| out.parse_schema(meta))?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| out.parse_serde(meta))?;
            }
        }
        Ok(out)
    }

    /// Serialization name; `schema` wins over `serde`.
    pub(crate) fn name(&self) -> Option<&str> {
        self.schema_name.as_deref().or(self.serde_name.as_deref())
    }

    pub(crate) fn is_excluded(&self) -> bool {
        self.name() == Some(EXCLUDED)
    }

    fn parse_schema(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("rename") {
            self.schema_name = Some(value_text(&meta)?);
            return Ok(());
        }
        if meta.path.is_ident("skip") {
            self.schema_name = Some(EXCLUDED.to_owned());
            return Ok(());
        }
        if meta.path.is_ident("required") {
            let text = if meta.input.peek(Token![=]) {
                value_text(&meta)?
            } else {
                "true".to_owned()
            };
            self.push("Required", text);
            return Ok(());
        }
        for (key, variant) in VALUE_KEYS {
            if meta.path.is_ident(key) {
                let text = value_text(&meta)?;
                self.push(variant, text);
                return Ok(());
            }
        }
        Err(meta.error("unsupported schema attribute"))
    }

    fn parse_serde(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("rename") {
            if meta.input.peek(Token![=]) {
                self.serde_name = Some(value_text(&meta)?);
            } else {
                // rename(serialize = "..", deserialize = "..")
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("serialize") {
                        self.serde_name = Some(value_text(&inner)?);
                        Ok(())
                    } else {
                        ignore(inner)
                    }
                })?;
            }
            return Ok(());
        }
        if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
            self.serde_name = Some(EXCLUDED.to_owned());
            return Ok(());
        }
        ignore(meta)
    }

    fn push(&mut self, variant: &str, text: String) {
        self.tags.push((Ident::new(variant, Span::call_site()), text));
    }

    /// Anything besides naming, for places that cannot carry annotations.
    pub(crate) fn has_constraints(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Container-level `#[serde(...)]` keys that change member names.
#[derive(Debug, Default)]
pub(crate) struct ContainerAttrs {
    pub(crate) rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    pub(crate) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| out.parse_serde(meta))?;
            }
        }
        Ok(out)
    }

    fn parse_serde(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if !meta.path.is_ident("rename_all") {
            return ignore(meta);
        }
        if meta.input.peek(Token![=]) {
            self.rename_all = Some(rename_rule(&meta)?);
            return Ok(());
        }
        // rename_all(serialize = "..", deserialize = "..")
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("serialize") {
                self.rename_all = Some(rename_rule(&inner)?);
                Ok(())
            } else {
                ignore(inner)
            }
        })
    }
}

fn rename_rule(meta: &ParseNestedMeta) -> Result<RenameRule> {
    let lit: LitStr = meta.value()?.parse()?;
    RenameRule::parse(&lit.value())
        .ok_or_else(|| syn::Error::new_spanned(&lit, format!("unknown rename_all rule {:?}", lit.value())))
}

/// Consumes a nested meta item we have no use for.
fn ignore(meta: ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(ignore)?;
    }
    Ok(())
}

/// Raw text of `key = <literal>`; numbers keep their source spelling.
fn value_text(meta: &ParseNestedMeta) -> Result<String> {
    let expr: Expr = meta.value()?.parse()?;
    expr_text(&expr)
}

fn expr_text(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_owned()),
            Lit::Float(f) => Ok(f.base10_digits().to_owned()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "expected a string, number or bool literal",
            )),
        },
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr: inner, .. }) => match inner.as_ref() {
            Expr::Lit(ExprLit { lit: Lit::Int(_) | Lit::Float(_), .. }) => {
                Ok(format!("-{}", expr_text(inner)?))
            }
            other => Err(syn::Error::new_spanned(other, "only numbers can be negated")),
        },
        Expr::Group(group) => expr_text(&group.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or bool literal",
        )),
    }
}
