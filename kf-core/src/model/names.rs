use std::net::IpAddr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::*;

const DNS1123_LABEL_MAX_LEN: usize = 63;
const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;
const PORT_NAME_MAX_LEN: usize = 15;

lazy_static! {
    static ref DNS1123_LABEL: Regex = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap();
    static ref DNS1123_SUBDOMAIN: Regex =
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap();
    static ref GENERATE_NAME_PREFIX: Regex = Regex::new(r"^[a-z0-9]([-a-z0-9.]*)?$").unwrap();
    static ref ENV_VAR_NAME: Regex = Regex::new(r"^[-._a-zA-Z][-._a-zA-Z0-9]*$").unwrap();
    static ref QUALIFIED_KEY: Regex = Regex::new(concat!(
        r"^([a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/)?",
        r"[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$",
    ))
    .unwrap();
    static ref QUANTITY: Regex =
        Regex::new(r"^(?P<num>[0-9]+(\.[0-9]+)?|\.[0-9]+)(?P<suffix>n|u|m|k|M|G|T|P|E|Ki|Mi|Gi|Ti|Pi|Ei)?$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

pub(crate) fn check_dns1123_label(field: &str, value: &str) -> ValidationResult<()> {
    check!(!value.is_empty(), field, "must be non-empty");
    check!(
        value.len() <= DNS1123_LABEL_MAX_LEN,
        field,
        "{value:?} exceeds {DNS1123_LABEL_MAX_LEN} characters"
    );
    check!(DNS1123_LABEL.is_match(value), field, "{value:?} is not a valid DNS-1123 label");
    Ok(())
}

pub(crate) fn check_dns1123_subdomain(field: &str, value: &str) -> ValidationResult<()> {
    check!(!value.is_empty(), field, "must be non-empty");
    check!(
        value.len() <= DNS1123_SUBDOMAIN_MAX_LEN,
        field,
        "{value:?} exceeds {DNS1123_SUBDOMAIN_MAX_LEN} characters"
    );
    check!(DNS1123_SUBDOMAIN.is_match(value), field, "{value:?} is not a valid DNS-1123 subdomain");
    Ok(())
}

pub(crate) fn check_generate_name(field: &str, value: &str) -> ValidationResult<()> {
    check!(!value.is_empty(), field, "must be non-empty when set");
    check!(GENERATE_NAME_PREFIX.is_match(value), field, "{value:?} is not a valid name prefix");
    Ok(())
}

// IANA service names: lowercase alphanumerics and dashes, at most 15 characters, at least one letter
pub(crate) fn check_port_name(field: &str, value: &str) -> ValidationResult<()> {
    check!(
        value.len() <= PORT_NAME_MAX_LEN,
        field,
        "{value:?} exceeds {PORT_NAME_MAX_LEN} characters"
    );
    check!(DNS1123_LABEL.is_match(value), field, "{value:?} is not a valid port name");
    check!(!value.contains("--"), field, "{value:?} must not contain consecutive dashes");
    check!(value.chars().any(|c| c.is_ascii_lowercase()), field, "{value:?} must contain a letter");
    Ok(())
}

pub(crate) fn check_env_var_name(field: &str, value: &str) -> ValidationResult<()> {
    check!(ENV_VAR_NAME.is_match(value), field, "{value:?} is not a valid environment variable name");
    Ok(())
}

// Label and annotation keys share the same "optional DNS prefix, slash, name" format
pub(crate) fn check_qualified_key(field: &str, key: &str) -> ValidationResult<()> {
    check!(QUALIFIED_KEY.is_match(key), field, "{key:?} is not a valid qualified key");
    Ok(())
}

pub(crate) fn check_decimal(field: &str, value: &str) -> ValidationResult<()> {
    check!(DECIMAL.is_match(value), field, "{value:?} must be a decimal integer");
    Ok(())
}

pub(crate) fn check_ip(field: &str, value: &str) -> ValidationResult<()> {
    check!(value.parse::<IpAddr>().is_ok(), field, "{value:?} is not an IP address");
    Ok(())
}

pub(crate) fn check_relative_path(field: &str, value: &str) -> ValidationResult<()> {
    check!(!value.is_empty(), field, "must be non-empty");
    check!(!value.starts_with('/'), field, "{value:?} must be a relative path");
    check!(!value.split('/').any(|part| part == ".."), field, "{value:?} must not contain '..'");
    Ok(())
}

// Convert a Kubernetes resource quantity into base units, e.g. "1m" -> 0.001 and "16Mi" ->
// 16777216.  Only the forms that show up in container resource lists are supported (no
// exponent notation, no signs).
pub fn quantity_value(q: &Quantity) -> Option<f64> {
    let caps = QUANTITY.captures(&q.0)?;
    let num: f64 = caps.name("num")?.as_str().parse().ok()?;
    let multiplier = match caps.name("suffix").map(|m| m.as_str()) {
        None => 1.0,
        Some("n") => 1e-9,
        Some("u") => 1e-6,
        Some("m") => 1e-3,
        Some("k") => 1e3,
        Some("M") => 1e6,
        Some("G") => 1e9,
        Some("T") => 1e12,
        Some("P") => 1e15,
        Some("E") => 1e18,
        Some("Ki") => 1024.0,
        Some("Mi") => 1024.0_f64.powi(2),
        Some("Gi") => 1024.0_f64.powi(3),
        Some("Ti") => 1024.0_f64.powi(4),
        Some("Pi") => 1024.0_f64.powi(5),
        Some("Ei") => 1024.0_f64.powi(6),
        Some(_) => return None,
    };
    Some(num * multiplier)
}

pub(crate) fn check_quantity(field: &str, q: &Quantity) -> ValidationResult<f64> {
    quantity_value(q).ok_or_else(|| ValidationError::new(field, format!("{:?} is not a valid quantity", q.0)))
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::simple("podinfo", true)]
    #[case::dashes("cool-name-podinfo", true)]
    #[case::upper("Podinfo", false)]
    #[case::trailing_dash("podinfo-", false)]
    #[case::dots("pod.info", false)]
    #[case::empty("", false)]
    fn test_dns1123_label(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(check_dns1123_label("name", value).is_ok(), ok);
    }

    #[rstest]
    #[case::http("http", true)]
    #[case::metrics("http-metrics", true)]
    #[case::too_long("this-is-way-too-long", false)]
    #[case::digits_only("9898", false)]
    #[case::double_dash("http--metrics", false)]
    fn test_port_name(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(check_port_name("name", value).is_ok(), ok);
    }

    #[rstest]
    #[case::millicores("1m", Some(0.001))]
    #[case::mebibytes("16Mi", Some(16.0 * 1024.0 * 1024.0))]
    #[case::plain("2", Some(2.0))]
    #[case::decimal("0.5", Some(0.5))]
    #[case::garbage("lots", None)]
    #[case::negative("-1", None)]
    fn test_quantity_value(#[case] value: &str, #[case] expected: Option<f64>) {
        assert_eq!(quantity_value(&Quantity(value.into())), expected);
    }

    #[rstest]
    #[case::prefixed("app.kubernetes.io/name", true)]
    #[case::bare("pod-template-hash", true)]
    #[case::bad_prefix("Foo_Bar/name", false)]
    fn test_qualified_key(#[case] key: &str, #[case] ok: bool) {
        assert_eq!(check_qualified_key("labels", key).is_ok(), ok);
    }
}
