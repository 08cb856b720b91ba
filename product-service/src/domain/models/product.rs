use serde_json::{json, Map, Value};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

use crate::error::InvalidProduct;

pub const DEFAULT_PRICE: i64 = 100;

const MALFORMED_BODY: &str = "Invalid Product: body of request contained bad or no data";

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Validate)]
pub struct Product {
    pub id: Option<i64>,
    #[validate(length(max = 63, message = "must be at most 63 characters"))]
    pub name: String,
    #[validate(length(max = 63, message = "must be at most 63 characters"))]
    pub category: String,
    pub price: i64,
    pub stock: i64,
    #[validate(length(max = 128, message = "must be at most 128 characters"))]
    pub description: Option<String>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            category: String::new(),
            price: DEFAULT_PRICE,
            stock: 0,
            description: None,
        }
    }
}

impl Product {
    pub fn new(name: &str, category: &str, price: i64, stock: i64, description: Option<&str>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            category: category.to_string(),
            price,
            stock,
            description: description.map(str::to_string),
        }
    }

    /// 输出全部六个字段，`id`/`description` 缺省时为 null
    pub fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "category": self.category,
            "price": self.price,
            "stock": self.stock,
            "description": self.description,
        })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product '{}' id=[{}]>", self.name, id),
            None => write!(f, "<Product '{}' id=[None]>", self.name),
        }
    }
}

/// Decodes a loosely typed JSON body onto `target`.
///
/// Every field problem is collected; `target` is only returned when the whole
/// body is valid. The `id` key of the body is never read.
pub fn decode_product(data: &Value, mut target: Product) -> Result<Product, InvalidProduct> {
    let Some(fields) = data.as_object() else {
        return Err(InvalidProduct::single(MALFORMED_BODY));
    };

    let mut invalid = InvalidProduct::default();

    match required_string(fields, "name") {
        Ok(name) => target.name = name,
        Err(problem) => invalid.push(problem),
    }
    match required_string(fields, "category") {
        Ok(category) => target.category = category,
        Err(problem) => invalid.push(problem),
    }
    match optional_string(fields, "description") {
        Ok(description) => target.description = description,
        Err(problem) => invalid.push(problem),
    }
    match required_integer(fields, "stock") {
        Ok(stock) => target.stock = stock,
        Err(problem) => invalid.push(problem),
    }
    match required_integer(fields, "price") {
        Ok(price) => target.price = price,
        Err(problem) => invalid.push(problem),
    }

    if !invalid.is_empty() {
        return Err(invalid);
    }

    if let Err(errors) = target.validate() {
        let mut problems: Vec<(usize, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    (field_rank(&field), format!("Invalid Product: {} {}", field, message))
                })
            })
            .collect();
        problems.sort();
        for (_, problem) in problems {
            invalid.push(problem);
        }
        return Err(invalid);
    }

    Ok(target)
}

fn field_rank(field: &str) -> usize {
    ["name", "category", "description"]
        .iter()
        .position(|f| *f == field)
        .unwrap_or(usize::MAX)
}

fn required_string(fields: &Map<String, Value>, key: &str) -> Result<String, String> {
    match fields.get(key) {
        None => Err(format!("Invalid Product: missing {}", key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("Invalid type for string [{}]: {}", key, type_name(other))),
    }
}

fn optional_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("Invalid type for string [{}]: {}", key, type_name(other))),
    }
}

fn required_integer(fields: &Map<String, Value>, key: &str) -> Result<i64, String> {
    let value = fields
        .get(key)
        .ok_or_else(|| format!("Invalid Product: missing {}", key))?;

    coerce_integer(value)
        .ok_or_else(|| format!("Invalid type for integer [{}]: {}", key, type_name(value)))
}

/// 原生整数，或仅由 ASCII 数字组成的非空字符串
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().ok()
        }
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
