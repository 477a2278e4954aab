use pretty_assertions::assert_eq;

use super::*;

fn fmt(arg: FormatArg<'_>, spec: &str) -> String {
    format_spec(arg, spec).unwrap_or_else(|err| panic!("{spec:?}: {err}"))
}

#[test]
fn float_repr_matches_shell_output() {
    assert_eq!(float_repr(1.0), "1.0");
    assert_eq!(float_repr(0.1), "0.1");
    assert_eq!(float_repr(-2.5), "-2.5");
    assert_eq!(float_repr(1e16), "1e+16");
    assert_eq!(float_repr(1.5e-5), "1.5e-05");
    assert_eq!(float_repr(123_456.789), "123456.789");
    assert_eq!(float_repr(f64::INFINITY), "inf");
    assert_eq!(float_repr(f64::NAN), "nan");
    assert_eq!(float_repr(-0.0), "-0.0");
}

#[test]
fn str_repr_picks_quotes() {
    assert_eq!(str_repr("abc"), "'abc'");
    assert_eq!(str_repr("it's"), "\"it's\"");
    assert_eq!(str_repr("both ' and \""), "'both \\' and \"'");
    assert_eq!(str_repr("a\nb\t\\"), "'a\\nb\\t\\\\'");
    assert_eq!(str_repr("\u{1}"), "'\\x01'");
    assert_eq!(str_repr("café"), "'café'");
}

#[test]
fn bytes_repr_escapes_non_printable_bytes() {
    assert_eq!(bytes_repr(b"ab"), "b'ab'");
    assert_eq!(bytes_repr(b"it's"), "b\"it's\"");
    assert_eq!(bytes_repr(&[0, b'\n', 0xff]), "b'\\x00\\n\\xff'");
    assert_eq!(bytes_repr(b""), "b''");
}

#[test]
fn complex_repr_drops_zero_real_parts() {
    assert_eq!(complex_repr(0.0, 1.0), "1j");
    assert_eq!(complex_repr(0.0, -2.5), "-2.5j");
    assert_eq!(complex_repr(1.0, 2.0), "(1+2j)");
    assert_eq!(complex_repr(1.5, -1.0), "(1.5-1j)");
    assert_eq!(complex_repr(-0.0, 0.0), "(-0+0j)");
}

#[test]
fn string_alignment_and_precision() {
    assert_eq!(fmt(FormatArg::Str("ab"), ">5"), "   ab");
    assert_eq!(fmt(FormatArg::Str("ab"), "<5"), "ab   ");
    assert_eq!(fmt(FormatArg::Str("ab"), "*^6"), "**ab**");
    assert_eq!(fmt(FormatArg::Str("abcdef"), ".3"), "abc");
    assert_eq!(fmt(FormatArg::Str("ab"), ""), "ab");
}

#[test]
fn integer_presentations() {
    assert_eq!(fmt(FormatArg::Int(42), "5"), "   42");
    assert_eq!(fmt(FormatArg::Int(42), "05"), "00042");
    assert_eq!(fmt(FormatArg::Int(-42), "05"), "-0042");
    assert_eq!(fmt(FormatArg::Int(1_234_567), ","), "1,234,567");
    assert_eq!(fmt(FormatArg::Int(255), "#x"), "0xff");
    assert_eq!(fmt(FormatArg::Int(5), "b"), "101");
    assert_eq!(fmt(FormatArg::Int(7), "+d"), "+7");
    assert_eq!(fmt(FormatArg::Int(3), ".2f"), "3.00");
}

#[test]
fn float_presentations() {
    assert_eq!(fmt(FormatArg::Float(3.14159), ".2f"), "3.14");
    assert_eq!(fmt(FormatArg::Float(2.5), "8.3f"), "   2.500");
    assert_eq!(fmt(FormatArg::Float(1234.5), ",.1f"), "1,234.5");
    assert_eq!(fmt(FormatArg::Float(0.256), ".1%"), "25.6%");
    assert_eq!(fmt(FormatArg::Float(12345.678), ".2e"), "1.23e+04");
    assert_eq!(fmt(FormatArg::Float(0.000_012_5), "g"), "1.25e-05");
    assert_eq!(fmt(FormatArg::Float(2.0), "g"), "2");
    assert_eq!(fmt(FormatArg::Float(1.5), ".2"), "1.5");
    assert_eq!(fmt(FormatArg::Float(2.0), ""), "2.0");
    assert_eq!(fmt(FormatArg::Float(-1.0), "+.1f"), "-1.0");
}

#[test]
fn invalid_specs_are_reported() {
    assert_eq!(
        format_spec(FormatArg::Str("x"), "d"),
        Err("Unknown format code 'd' for object of type 'str'".to_owned())
    );
    assert!(format_spec(FormatArg::Int(1), "5q2").is_err());
    assert!(format_spec(FormatArg::Float(1.0), ".").is_err());
}
