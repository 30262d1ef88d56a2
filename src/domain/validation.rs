/// 商品フィールドのバリデーション
///
/// すべて副作用のない純粋関数で、部分的な入力に対しても安全に呼び出せる。
/// フィールド値は`Option<&Value>`で表し、`None`はキーが存在しないことを意味する。
use std::collections::BTreeMap;

use serde_json::Value;

use super::product::ProductId;

/// フィールド名 → エラーメッセージのマップ
///
/// 空のマップは「このカテゴリにエラーなし」を表す。
pub type FieldErrors = BTreeMap<String, String>;

/// 検証対象のフィールド一覧（フィールド名と値の組）
pub type Fields<'a> = [(&'a str, Option<&'a Value>)];

/// パスパラメータのIDを整数として解釈する
///
/// 空白を除いて空でなく、有限の数値として解釈でき、
/// かつ整数である場合のみ`Some`を返す（"1.0"は1として扱う）。
pub fn parse_identifier(raw: Option<&str>) -> Option<ProductId> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(id) = trimmed.parse::<ProductId>() {
        return Some(id);
    }

    let number = trimmed.parse::<f64>().ok().filter(|n| n.is_finite())?;
    // i64の範囲外はキャストで飽和するため明示的に弾く
    if number.fract() != 0.0 || number < ProductId::MIN as f64 || number >= ProductId::MAX as f64 {
        return None;
    }
    Some(number as ProductId)
}

/// IDが整数として妥当かを判定
pub fn validate_identifier(raw: Option<&str>) -> bool {
    parse_identifier(raw).is_some()
}

/// 文字列フィールドが空白のみでないかを検証
///
/// 文字列以外の値（未指定を含む）はエラーにしない。
pub fn validate_text_fields(fields: &Fields<'_>) -> FieldErrors {
    collect_errors(fields, "must be a non-empty string", |value| match value {
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => true,
    })
}

/// 文字列カラムに文字列以外の値が渡されていないかを検証
///
/// 未指定とnullは許容する（存在チェックは`validate_required_fields`が担う）。
pub fn validate_string_fields(fields: &Fields<'_>) -> FieldErrors {
    collect_errors(fields, "must be a string", |value| match value {
        None | Some(Value::Null) => true,
        Some(v) => v.is_string(),
    })
}

/// 真偽値フィールドを検証
///
/// 未指定は許容するが、nullを含むbool以外の値はエラー。
pub fn validate_boolean_fields(fields: &Fields<'_>) -> FieldErrors {
    collect_errors(fields, "must be a boolean", |value| match value {
        None => true,
        Some(v) => v.is_boolean(),
    })
}

/// 数値フィールドを検証
///
/// 未指定は許容する。数値文字列（"5"など）は数値とみなさない。
pub fn validate_number_fields(fields: &Fields<'_>) -> FieldErrors {
    collect_errors(fields, "must be a number", |value| match value {
        None => true,
        Some(v) => v.is_number(),
    })
}

/// 必須フィールドの存在を検証（未指定とnullをエラーにする）
pub fn validate_required_fields(fields: &Fields<'_>) -> FieldErrors {
    collect_errors(fields, "is required", |value| {
        !matches!(value, None | Some(Value::Null))
    })
}

/// 複数カテゴリのエラーマップを1つに統合する
///
/// 同じフィールドが複数カテゴリでエラーになった場合は後のマップが優先される。
pub fn merge(maps: impl IntoIterator<Item = FieldErrors>) -> FieldErrors {
    maps.into_iter().flatten().collect()
}

fn collect_errors(
    fields: &Fields<'_>,
    message: &str,
    is_valid: impl Fn(Option<&Value>) -> bool,
) -> FieldErrors {
    fields
        .iter()
        .filter(|(_, value)| !is_valid(*value))
        .map(|(key, _)| (key.to_string(), format!("{} {}", key, message)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== ID検証 ====================

    #[test]
    fn test_validate_identifier_accepts_integers() {
        assert!(validate_identifier(Some("1")));
        assert!(validate_identifier(Some("42")));
        assert!(validate_identifier(Some("-3")));
        assert!(validate_identifier(Some(" 7 ")));
    }

    #[test]
    fn test_validate_identifier_accepts_integral_floats() {
        assert_eq!(parse_identifier(Some("1.0")), Some(1));
        assert_eq!(parse_identifier(Some("1e3")), Some(1000));
    }

    #[test]
    fn test_validate_identifier_rejects_non_integers() {
        assert!(!validate_identifier(None));
        assert!(!validate_identifier(Some("")));
        assert!(!validate_identifier(Some("   ")));
        assert!(!validate_identifier(Some("abc")));
        assert!(!validate_identifier(Some("1.5")));
        assert!(!validate_identifier(Some("12abc")));
        assert!(!validate_identifier(Some("NaN")));
        assert!(!validate_identifier(Some("inf")));
    }

    #[test]
    fn test_parse_identifier_rejects_out_of_range() {
        assert_eq!(parse_identifier(Some("1e300")), None);
        assert_eq!(parse_identifier(Some("99999999999999999999")), None);
    }

    // ==================== 文字列検証 ====================

    #[test]
    fn test_validate_text_fields_flags_blank_strings() {
        let empty = json!("");
        let blank = json!("   ");
        let ok = json!("widget");

        let errors = validate_text_fields(&[
            ("name", Some(&empty)),
            ("slug", Some(&blank)),
            ("description", Some(&ok)),
        ]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"], "name must be a non-empty string");
        assert_eq!(errors["slug"], "slug must be a non-empty string");
    }

    #[test]
    fn test_validate_text_fields_ignores_non_strings() {
        let number = json!(3);
        let null = Value::Null;

        let errors = validate_text_fields(&[
            ("name", None),
            ("slug", Some(&number)),
            ("description", Some(&null)),
        ]);

        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_string_fields() {
        let number = json!(5);
        let text = json!("");
        let null = Value::Null;

        let errors = validate_string_fields(&[
            ("name", Some(&number)),
            ("slug", Some(&text)),
            ("description", Some(&null)),
            ("other", None),
        ]);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], "name must be a string");
    }

    // ==================== 真偽値検証 ====================

    #[test]
    fn test_validate_boolean_fields() {
        let yes = json!(true);
        let text = json!("true");
        let null = Value::Null;

        assert!(validate_boolean_fields(&[("featured", None)]).is_empty());
        assert!(validate_boolean_fields(&[("featured", Some(&yes))]).is_empty());

        let errors = validate_boolean_fields(&[("featured", Some(&text))]);
        assert_eq!(errors["featured"], "featured must be a boolean");

        let errors = validate_boolean_fields(&[("featured", Some(&null))]);
        assert!(errors.contains_key("featured"));
    }

    // ==================== 数値検証 ====================

    #[test]
    fn test_validate_number_fields() {
        let zero = json!(0);
        let float = json!(9.99);
        let text = json!("free");
        let numeric_text = json!("5");

        assert!(validate_number_fields(&[("price", None)]).is_empty());
        assert!(validate_number_fields(&[("price", Some(&zero))]).is_empty());
        assert!(validate_number_fields(&[("price", Some(&float))]).is_empty());

        let errors = validate_number_fields(&[("price", Some(&text))]);
        assert_eq!(errors["price"], "price must be a number");

        assert!(!validate_number_fields(&[("price", Some(&numeric_text))]).is_empty());
    }

    // ==================== 必須検証・統合 ====================

    #[test]
    fn test_validate_required_fields() {
        let value = json!("x");
        let null = Value::Null;

        let errors = validate_required_fields(&[
            ("name", Some(&value)),
            ("slug", None),
            ("description", Some(&null)),
        ]);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["slug"], "slug is required");
        assert_eq!(errors["description"], "description is required");
    }

    #[test]
    fn test_merge_later_maps_take_precedence() {
        let required = FieldErrors::from([("price".to_string(), "price is required".to_string())]);
        let number = FieldErrors::from([("price".to_string(), "price must be a number".to_string())]);
        let text = FieldErrors::from([("name".to_string(), "name must be a non-empty string".to_string())]);

        let merged = merge([required, text, number]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["price"], "price must be a number");
    }

    #[test]
    fn test_merge_empty_maps() {
        assert!(merge([FieldErrors::new(), FieldErrors::new()]).is_empty());
    }
}
