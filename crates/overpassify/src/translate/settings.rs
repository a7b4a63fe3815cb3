//! Settings header and output flags

use indexmap::{IndexMap, IndexSet};

use crate::ast::core::{OutputOption, Scalar, SettingValue};
use crate::error::ErrorKind;
use crate::pretty::escape_string;

/// Verbosity, geometry and sort flags accepted by `out`
pub const OUTPUT_FLAGS: [&str; 12] = [
    "ids", "skel", "body", "tags", "meta", "noids", "geom", "bb", "center", "count", "qt", "asc",
];

/// Recognized flags in first-occurrence order, repeats dropped
pub(super) fn output_flags(options: &[OutputOption]) -> Result<IndexSet<&str>, ErrorKind> {
    let mut flags = IndexSet::new();
    for option in options {
        let flag = option.flag.as_str();
        if !OUTPUT_FLAGS.contains(&flag) {
            return Err(ErrorKind::UnknownOption {
                context: "out",
                key: option.flag.clone(),
            });
        }
        flags.insert(flag);
    }
    Ok(flags)
}

/// `[out:json][timeout:25];`, or nothing for an empty declaration
pub(super) fn header(options: &IndexMap<String, SettingValue>) -> Result<Option<String>, ErrorKind> {
    if options.is_empty() {
        return Ok(None);
    }
    let mut header = String::new();
    for (key, value) in options {
        let rendered = render(key, value)?;
        header.push_str(&format!("[{key}:{rendered}]"));
    }
    header.push(';');
    Ok(Some(header))
}

fn render(key: &str, value: &SettingValue) -> Result<String, ErrorKind> {
    let wrong_shape = || ErrorKind::UnsupportedConstruct(format!("value for setting `{key}`"));
    match key {
        "timeout" | "maxsize" => match value {
            SettingValue::Scalar(Scalar::Number(n)) if n.0 >= 0.0 => Ok(n.to_string()),
            _ => Err(wrong_shape()),
        },
        "out" => match value {
            SettingValue::Scalar(Scalar::String(format))
                if !format.is_empty() && format.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Ok(format.clone())
            }
            _ => Err(wrong_shape()),
        },
        "bbox" => match value {
            SettingValue::List(items) if items.len() == 4 => {
                let mut edges = Vec::with_capacity(4);
                for item in items {
                    let Scalar::Number(n) = item else {
                        return Err(wrong_shape());
                    };
                    edges.push(n.to_string());
                }
                Ok(edges.join(","))
            }
            // Already formatted: "south,west,north,east"
            SettingValue::Scalar(Scalar::String(bbox)) => Ok(bbox.clone()),
            _ => Err(wrong_shape()),
        },
        "date" => match value {
            SettingValue::Scalar(Scalar::String(date)) => Ok(quoted(date)),
            _ => Err(wrong_shape()),
        },
        "diff" | "adiff" => match value {
            SettingValue::Scalar(Scalar::String(date)) => Ok(quoted(date)),
            SettingValue::List(items) if (1..=2).contains(&items.len()) => {
                let mut dates = Vec::with_capacity(items.len());
                for item in items {
                    let Scalar::String(date) = item else {
                        return Err(wrong_shape());
                    };
                    dates.push(quoted(date));
                }
                Ok(dates.join(","))
            }
            _ => Err(wrong_shape()),
        },
        _ => Err(ErrorKind::UnknownOption {
            context: "Settings",
            key: key.to_string(),
        }),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}
