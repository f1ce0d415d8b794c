//! Maps generated proxy class names back to the domain class they wrap.

/// Markers that code generators append to the real class name.
const PROXY_MARKERS: &[&str] = &["$$EnhancerByCGLIB$$", "_$$_javassist", "$HibernateProxy$"];

/// Strips proxy/enhancer suffixes so every variant of a class shares one
/// specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassSubstitutor;

impl ClassSubstitutor {
    pub fn substitute<'a>(&self, class_name: &'a str) -> &'a str {
        PROXY_MARKERS
            .iter()
            .filter_map(|marker| class_name.find(marker))
            .min()
            .map_or(class_name, |cut| &class_name[..cut])
    }

    pub fn is_proxy(&self, class_name: &str) -> bool {
        PROXY_MARKERS.iter().any(|m| class_name.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_markers() {
        let s = ClassSubstitutor;
        assert_eq!(
            s.substitute("com.acme.Order$$EnhancerByCGLIB$$1a2b"),
            "com.acme.Order"
        );
        assert_eq!(s.substitute("com.acme.Order_$$_javassist_7"), "com.acme.Order");
        assert_eq!(
            s.substitute("com.acme.Customer$HibernateProxy$Xy"),
            "com.acme.Customer"
        );
    }

    #[test]
    fn leaves_plain_names_alone() {
        let s = ClassSubstitutor;
        assert_eq!(s.substitute("com.acme.Order"), "com.acme.Order");
        assert!(!s.is_proxy("com.acme.Order"));
        assert!(s.is_proxy("com.acme.Order$$EnhancerByCGLIB$$1"));
    }
}
