//! 配置模块，负责加载对象字段元数据的JSON配置文件

use crate::ast::{FieldDescriptor, FieldType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 元数据配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法读取配置文件 {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 对象目录：对象API名到字段元数据列表的映射
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectCatalog {
    #[serde(flatten)]
    pub objects: HashMap<String, Vec<FieldDescriptor>>,
}

impl ObjectCatalog {
    /// 从JSON文件加载对象目录
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let objects: HashMap<String, Vec<FieldDescriptor>> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path_ref.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %path_ref.display(), objects = objects.len(), "loaded object catalog");
        Ok(ObjectCatalog { objects })
    }

    /// 按名称查找对象的字段（忽略大小写），返回规范的对象名与字段列表
    pub fn fields_of(&self, object: &str) -> Option<(&str, &[FieldDescriptor])> {
        self.objects
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(object))
            .map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }

    /// 按字母顺序返回所有对象名
    pub fn object_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.objects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 内置示例目录（用于测试或fallback）
    pub fn sample() -> Self {
        use FieldType::*;

        let account = vec![
            FieldDescriptor::new("Id", "Account ID", Id),
            FieldDescriptor::new("Name", "Account Name", String),
            FieldDescriptor::new("Industry", "Industry", Picklist),
            FieldDescriptor::new("Type", "Account Type", Picklist),
            FieldDescriptor::new("AnnualRevenue", "Annual Revenue", Currency),
            FieldDescriptor::new("NumberOfEmployees", "Employees", Integer),
            FieldDescriptor::new("IsDeleted", "Deleted", Boolean),
            FieldDescriptor::new("CreatedDate", "Created Date", Datetime),
            FieldDescriptor::new("Description", "Description", Textarea),
        ];

        let mut account_ref = FieldDescriptor::new("AccountId", "Account ID", Reference);
        account_ref.reference_to = Some(vec!["Account".to_string()]);
        account_ref.relationship_name = Some("Account".to_string());

        let contact = vec![
            FieldDescriptor::new("Id", "Contact ID", Id),
            FieldDescriptor::new("FirstName", "First Name", String),
            FieldDescriptor::new("LastName", "Last Name", String),
            FieldDescriptor::new("Email", "Email", Email),
            account_ref.clone(),
            FieldDescriptor::new("Birthdate", "Birthdate", Date),
            FieldDescriptor::new("HasOptedOutOfEmail", "Email Opt Out", Boolean),
        ];

        let opportunity = vec![
            FieldDescriptor::new("Id", "Opportunity ID", Id),
            FieldDescriptor::new("Name", "Name", String),
            FieldDescriptor::new("StageName", "Stage", Picklist),
            FieldDescriptor::new("Amount", "Amount", Currency),
            FieldDescriptor::new("Probability", "Probability (%)", Percent),
            FieldDescriptor::new("CloseDate", "Close Date", Date),
            FieldDescriptor::new("Competitors__c", "Competitors", Multipicklist),
            account_ref,
        ];

        let mut objects = HashMap::new();
        objects.insert("Account".to_string(), account);
        objects.insert("Contact".to_string(), contact);
        objects.insert("Opportunity".to_string(), opportunity);

        Self { objects }
    }
}
