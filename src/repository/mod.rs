// ==========================================
// 配件目录管理系统 - 仓储层模块声明
// ==========================================

pub mod catalog_import_repo;
pub mod catalog_import_repo_impl;
pub mod error;

pub use catalog_import_repo::CatalogImportRepository;
pub use catalog_import_repo_impl::CatalogImportRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
