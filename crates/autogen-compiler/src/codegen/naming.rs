//! Names of the generated artifacts.

use std::path::PathBuf;

use crate::config::Conventions;
use crate::ir::{InterfaceDescriptor, TypeRef};

/// Package and simple name of a generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    pub package: String,
    pub name: String,
}

impl GeneratedName {
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::qualified(&self.qualified())
    }

    /// `com/app/request/UserApiRequest.kt`, relative to the output root.
    pub fn file_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.kt", self.name));
        path
    }
}

/// `{ns}.request.{Name}Request` with the default conventions.
pub fn request_name(interface: &InterfaceDescriptor, conventions: &Conventions) -> GeneratedName {
    derive(interface, &conventions.request_sub_package, &conventions.request_suffix)
}

/// `{ns}.repository.{Name}Repository` with the default conventions.
pub fn repository_name(interface: &InterfaceDescriptor, conventions: &Conventions) -> GeneratedName {
    derive(interface, &conventions.repository_sub_package, &conventions.repository_suffix)
}

fn derive(interface: &InterfaceDescriptor, sub_package: &str, suffix: &str) -> GeneratedName {
    let package = match (interface.namespace.is_empty(), sub_package.is_empty()) {
        (true, _) => sub_package.to_string(),
        (false, true) => interface.namespace.clone(),
        (false, false) => format!("{}.{}", interface.namespace, sub_package),
    };
    GeneratedName {
        package,
        name: format!("{}{}", interface.simple_name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn interface(namespace: &str) -> InterfaceDescriptor {
        InterfaceDescriptor {
            simple_name: "UserApi".to_string(),
            namespace: namespace.to_string(),
            enclosing: Vec::new(),
            host: String::new(),
            star_imports: Vec::new(),
            origin: None,
        }
    }

    #[test]
    fn test_default_names() {
        let conventions = Conventions::default();
        let request = request_name(&interface("com.app.api"), &conventions);
        assert_eq!(request.qualified(), "com.app.api.request.UserApiRequest");
        assert_eq!(request.file_path(), Path::new("com/app/api/request/UserApiRequest.kt"));

        let repository = repository_name(&interface("com.app.api"), &conventions);
        assert_eq!(repository.qualified(), "com.app.api.repository.UserApiRepository");
    }

    #[test]
    fn test_empty_namespace_and_sub_package() {
        let conventions = Conventions {
            repository_sub_package: String::new(),
            ..Conventions::default()
        };
        assert_eq!(request_name(&interface(""), &conventions).qualified(), "request.UserApiRequest");
        assert_eq!(
            repository_name(&interface("com.app"), &conventions).qualified(),
            "com.app.UserApiRepository"
        );

        let flat = Conventions {
            request_sub_package: String::new(),
            ..Conventions::default()
        };
        let name = request_name(&interface(""), &flat);
        assert_eq!(name.qualified(), "UserApiRequest");
        assert_eq!(name.file_path(), Path::new("UserApiRequest.kt"));
    }
}
