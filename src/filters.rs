//! Case-conversion filters registered on every compiled template set.

use std::collections::HashMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use tera::{Result, Tera, Value};

type CaseFn = fn(&str) -> String;

const CASE_FILTERS: [(&str, CaseFn); 4] = [
    ("snake_case", |s| s.to_snake_case()),
    ("pascal_case", |s| s.to_pascal_case()),
    ("camel_case", |s| s.to_lower_camel_case()),
    ("kebab_case", |s| s.to_kebab_case()),
];

pub(crate) fn register(tera: &mut Tera) {
    for (name, convert) in CASE_FILTERS {
        tera.register_filter(name, move |value: &Value, _args: &HashMap<String, Value>| {
            convert_case(name, convert, value)
        });
    }
}

fn convert_case(filter: &str, convert: CaseFn, value: &Value) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a string")))?;
    Ok(Value::String(convert(s)))
}
