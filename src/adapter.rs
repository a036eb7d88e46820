use crate::validate::CompilerError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREATE_STYLE: &str = "__create_style__";

/// Platform attribute names for the loop wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adapter {
    pub name: String,
    pub for_attr: String,
    pub for_item: String,
    pub for_index: String,
    pub key: String,
    #[serde(default = "default_create_style")]
    pub create_style: String,
    #[serde(default = "default_style_attributes")]
    pub style_attributes: Vec<String>,
}

fn default_create_style() -> String {
    DEFAULT_CREATE_STYLE.to_string()
}

fn default_style_attributes() -> Vec<String> {
    vec!["style".to_string()]
}

impl Adapter {
    fn with_prefix(name: &str, prefix: &str) -> Self {
        Adapter {
            name: name.to_string(),
            for_attr: format!("{}:for", prefix),
            for_item: format!("{}:for-item", prefix),
            for_index: format!("{}:for-index", prefix),
            key: format!("{}:key", prefix),
            create_style: default_create_style(),
            style_attributes: default_style_attributes(),
        }
    }

    pub fn ali() -> Self {
        Adapter::with_prefix("ali", "a")
    }

    pub fn wechat() -> Self {
        Adapter::with_prefix("wechat", "wx")
    }

    pub fn bytedance() -> Self {
        Adapter::with_prefix("bytedance", "tt")
    }

    pub fn by_name(name: &str) -> Result<Self, CompilerError> {
        match name {
            "ali" | "alipay" => Ok(Adapter::ali()),
            "wechat" | "weixin" => Ok(Adapter::wechat()),
            "bytedance" | "toutiao" => Ok(Adapter::bytedance()),
            other => Err(CompilerError::new(
                crate::validate::ERR_ADAPTER,
                &format!("Unknown adapter '{}'.", other),
                "",
                1,
                1,
            )
            .with_hints(vec!["Use one of: ali, wechat, bytedance.".to_string()])),
        }
    }

    pub fn is_style_attribute(&self, name: &str) -> bool {
        self.style_attributes.iter().any(|attr| attr == name)
    }

    /// The four wrapper attribute names in emission order.
    pub fn loop_attributes(&self) -> [&str; 4] {
        [&self.for_attr, &self.for_item, &self.for_index, &self.key]
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Adapter::ali()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(Adapter::ali().loop_attributes(), ["a:for", "a:for-item", "a:for-index", "a:key"]);
        assert_eq!(Adapter::wechat().for_attr, "wx:for");
        assert_eq!(Adapter::bytedance().key, "tt:key");
        assert_eq!(Adapter::ali().create_style, "__create_style__");
    }

    #[test]
    fn test_unknown_preset() {
        let err = Adapter::by_name("swan").unwrap_err();
        assert_eq!(err.code, "LIST-ERR-ADAPTER");
    }

    #[test]
    fn test_deserialize_custom_adapter() {
        let adapter: Adapter = serde_json::from_str(
            r#"{"name":"qq","forAttr":"qq:for","forItem":"qq:for-item","forIndex":"qq:for-index","key":"qq:key"}"#,
        )
        .unwrap();
        assert_eq!(adapter.create_style, DEFAULT_CREATE_STYLE);
        assert!(adapter.is_style_attribute("style"));
        assert!(!adapter.is_style_attribute("class"));
    }
}
