use super::{
    error::TaskError,
    fields::{read_instant, read_text, write_instant},
};
use crate::{
    service::object::{ObjectRef, Property},
    utils::time::Instant,
};

/// Administrative details about a task: who wrote it, when, and why
#[derive(Debug, Clone)]
pub struct RegistrationInfo {
    handle: ObjectRef,
}

/// Generate a getter and setter pair for an optional text property
macro_rules! text_property {
    ($($getter:ident, $setter:ident, $property:expr;)+) => {
        $(
            pub fn $getter(&self) -> Result<Option<String>, TaskError> {
                read_text(&self.handle, $property)
            }

            pub fn $setter(&self, value: &str) -> Result<(), TaskError> {
                Ok(self.handle.put_text($property, value)?)
            }
        )+
    };
}

impl RegistrationInfo {
    pub(crate) fn new(handle: ObjectRef) -> RegistrationInfo {
        RegistrationInfo { handle }
    }

    text_property! {
        author, set_author, Property::Author;
        description, set_description, Property::Description;
        documentation, set_documentation, Property::Documentation;
        security_descriptor, set_security_descriptor, Property::SecurityDescriptor;
        source, set_source, Property::Source;
        uri, set_uri, Property::Uri;
        version, set_version, Property::Version;
        xml_text, set_xml_text, Property::XmlText;
    }

    /// When the task was registered
    pub fn date(&self) -> Result<Option<Instant>, TaskError> {
        read_instant(&self.handle, Property::Date)
    }

    pub fn set_date(&self, value: Option<Instant>) -> Result<(), TaskError> {
        write_instant(&self.handle, Property::Date, value)
    }
}

#[cfg(test)]
mod tests {
    use super::RegistrationInfo;
    use crate::{
        service::{
            memory::memory_service,
            object::{Method, Property, ServiceObject},
        },
        utils::time::decode_instant,
    };

    fn registration_info() -> RegistrationInfo {
        let service = memory_service();
        service
            .call(Method::Connect {
                server: None,
                user: None,
                domain: None,
                password: None,
            })
            .unwrap();
        let definition = service.call(Method::NewTask(0)).unwrap().into_object().unwrap();
        RegistrationInfo::new(definition.get_object(Property::RegistrationInfo).unwrap())
    }

    #[test]
    fn test_date() {
        let info = registration_info();
        assert_eq!(info.date().unwrap(), None);

        let date = decode_instant("2023-11-14T22:13:20-05:00").unwrap();
        info.set_date(date).unwrap();
        assert_eq!(info.date().unwrap(), date);
        assert_eq!(
            info.handle.text(Property::Date).unwrap(),
            "2023-11-14T22:13:20-05:00"
        );

        info.set_date(None).unwrap();
        assert_eq!(info.date().unwrap(), None);
    }

    #[test]
    fn test_text_properties() {
        let info = registration_info();
        assert_eq!(info.author().unwrap(), None);

        info.set_author("CORP\\admin").unwrap();
        info.set_description("Rotates the audit logs").unwrap();
        info.set_uri("\\Maintenance\\Rotate").unwrap();
        info.set_version("1.2").unwrap();

        assert_eq!(info.author().unwrap().unwrap(), "CORP\\admin");
        assert_eq!(
            info.description().unwrap().unwrap(),
            "Rotates the audit logs"
        );
        assert_eq!(info.uri().unwrap().unwrap(), "\\Maintenance\\Rotate");
        assert_eq!(info.version().unwrap().unwrap(), "1.2");
        assert_eq!(info.security_descriptor().unwrap(), None);
    }
}
