//! Parser layer
//! - dependencies_xml.rs: Dependencies.xml parser for installed adapter versions

pub mod dependencies_xml;

pub use dependencies_xml::{DeclaredVersions, DependenciesXmlParser};
