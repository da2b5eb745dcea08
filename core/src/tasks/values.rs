use super::{collection, error::TaskError};
use crate::service::object::{Method, ObjectRef, Property};
use std::collections::BTreeMap;

/// A name and value, used for email header fields and event value queries
#[derive(Debug, Clone)]
pub struct TaskNamedValuePair {
    handle: ObjectRef,
}

impl TaskNamedValuePair {
    pub(crate) fn new(handle: ObjectRef) -> TaskNamedValuePair {
        TaskNamedValuePair { handle }
    }

    pub fn name(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Name)?)
    }

    pub fn set_name(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Name, value)?)
    }

    pub fn value(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Value)?)
    }

    pub fn set_value(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Value, value)?)
    }

    pub fn as_tuple(&self) -> Result<(String, String), TaskError> {
        Ok((self.name()?, self.value()?))
    }
}

#[derive(Debug, Clone)]
pub struct TaskNamedValueCollection {
    handle: ObjectRef,
}

impl TaskNamedValueCollection {
    pub(crate) fn new(handle: ObjectRef) -> TaskNamedValueCollection {
        TaskNamedValueCollection { handle }
    }

    pub(crate) fn handle(&self) -> &ObjectRef {
        &self.handle
    }

    pub fn count(&self) -> Result<usize, TaskError> {
        collection::count(&self.handle)
    }

    pub fn len(&self) -> Result<usize, TaskError> {
        self.count()
    }

    pub fn is_empty(&self) -> Result<bool, TaskError> {
        Ok(self.count()? == 0)
    }

    pub fn item(&self, index: usize) -> Result<TaskNamedValuePair, TaskError> {
        Ok(TaskNamedValuePair::new(collection::item(&self.handle, index)?))
    }

    pub fn to_vec(&self) -> Result<Vec<TaskNamedValuePair>, TaskError> {
        let pairs = collection::items(&self.handle)?;
        Ok(pairs.into_iter().map(TaskNamedValuePair::new).collect())
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<TaskNamedValuePair>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }

    /// Pairs as a map. Later duplicates win
    pub fn to_map(&self) -> Result<BTreeMap<String, String>, TaskError> {
        let mut map = BTreeMap::new();
        for pair in self.iter()? {
            let (name, value) = pair.as_tuple()?;
            map.insert(name, value);
        }
        Ok(map)
    }

    pub fn create(&self, name: &str, value: &str) -> Result<TaskNamedValuePair, TaskError> {
        let reply = self.handle.call(Method::CreatePair {
            name: name.to_string(),
            value: value.to_string(),
        })?;
        Ok(TaskNamedValuePair::new(reply.into_object()?))
    }

    pub fn remove(&self, index: usize) -> Result<(), TaskError> {
        collection::remove(&self.handle, index)
    }

    pub fn clear(&self) -> Result<(), TaskError> {
        collection::clear(&self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskNamedValueCollection;
    use crate::{
        service::{
            memory::memory_service,
            object::{Method, Property, ServiceObject},
        },
        tasks::error::TaskError,
    };

    fn header_fields() -> TaskNamedValueCollection {
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
        let actions = definition.get_object(Property::Actions).unwrap();
        let email = actions.call(Method::Create(6)).unwrap().into_object().unwrap();
        TaskNamedValueCollection::new(email.get_object(Property::HeaderFields).unwrap())
    }

    #[test]
    fn test_create_and_item() {
        let fields = header_fields();
        assert!(fields.is_empty().unwrap());

        fields.create("X-Priority", "1").unwrap();
        let pair = fields.create("X-Mailer", "tasks").unwrap();
        pair.set_value("scheduler").unwrap();

        assert_eq!(fields.len().unwrap(), 2);
        assert_eq!(
            fields.item(1).unwrap().as_tuple().unwrap(),
            (String::from("X-Mailer"), String::from("scheduler"))
        );
        assert_eq!(fields.item(2).unwrap_err(), TaskError::IndexOutOfRange);
    }

    #[test]
    fn test_to_map() {
        let fields = header_fields();
        fields.create("b", "2").unwrap();
        fields.create("a", "1").unwrap();

        let map = fields.to_map().unwrap();
        assert_eq!(map.get("a").unwrap(), "1");
        assert_eq!(map.len(), 2);

        fields.remove(0).unwrap();
        assert_eq!(fields.item(0).unwrap().name().unwrap(), "a");
        fields.clear().unwrap();
        assert_eq!(fields.count().unwrap(), 0);
    }
}
