/**
 * Actions are what a task does when it starts.
 *
 * The service hands back untyped action handles. Each handle reports its kind through the `Type` property and
 * `wrap_action` turns it into the matching typed wrapper using a fixed table of constructors.
 *
 * References:
 * `https://learn.microsoft.com/en-us/windows/win32/taskschd/actioncollection`
 */
use super::{
    collection,
    error::TaskError,
    fields::{read_enum, read_text},
    values::TaskNamedValueCollection,
};
use crate::service::object::{Method, ObjectRef, Property};
use common::windows::ActionKind;
use log::error;

/// Builds the typed wrapper for one kind of action
pub type ActionConstructor = fn(ObjectRef) -> Action;

/// Every action kind that has a wrapper
static ACTION_VARIANTS: [(ActionKind, ActionConstructor); 4] = [
    (ActionKind::Exec, exec_variant),
    (ActionKind::ComHandler, com_handler_variant),
    (ActionKind::SendEmail, email_variant),
    (ActionKind::ShowMessage, show_message_variant),
];

fn exec_variant(handle: ObjectRef) -> Action {
    Action::Exec(ExecAction { handle })
}

fn com_handler_variant(handle: ObjectRef) -> Action {
    Action::ComHandler(ComHandlerAction { handle })
}

fn email_variant(handle: ObjectRef) -> Action {
    Action::SendEmail(EmailAction { handle })
}

fn show_message_variant(handle: ObjectRef) -> Action {
    Action::ShowMessage(ShowMessageAction { handle })
}

/// Look up the wrapper constructor for an action kind
pub fn resolve_action_variant(kind: ActionKind) -> Result<ActionConstructor, TaskError> {
    for (variant_kind, constructor) in ACTION_VARIANTS.iter() {
        if *variant_kind == kind {
            return Ok(*constructor);
        }
    }
    error!("[actions] No wrapper registered for action kind {kind:?}");
    Err(TaskError::UnsupportedKind)
}

/// Wrap an action handle in the type matching its `Type` property
pub fn wrap_action(handle: ObjectRef) -> Result<Action, TaskError> {
    let raw = handle.integer(Property::Type)?;
    let kind = match i32::try_from(raw).map(ActionKind::try_from) {
        Ok(Ok(result)) => result,
        _ => {
            error!("[actions] Service returned unknown action type {raw}");
            return Err(TaskError::UnsupportedKind);
        }
    };
    let constructor = resolve_action_variant(kind)?;
    Ok(constructor(handle))
}

#[derive(Debug, Clone)]
pub enum Action {
    Exec(ExecAction),
    ComHandler(ComHandlerAction),
    SendEmail(EmailAction),
    ShowMessage(ShowMessageAction),
}

impl Action {
    /// Kind of the action. Fixed when the action was created
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Exec(_) => ActionKind::Exec,
            Action::ComHandler(_) => ActionKind::ComHandler,
            Action::SendEmail(_) => ActionKind::SendEmail,
            Action::ShowMessage(_) => ActionKind::ShowMessage,
        }
    }

    pub(crate) fn handle(&self) -> &ObjectRef {
        match self {
            Action::Exec(action) => &action.handle,
            Action::ComHandler(action) => &action.handle,
            Action::SendEmail(action) => &action.handle,
            Action::ShowMessage(action) => &action.handle,
        }
    }

    /// Kind as reported by the service
    pub fn reported_kind(&self) -> Result<ActionKind, TaskError> {
        read_enum(self.handle(), Property::Type)
    }

    pub fn id(&self) -> Result<Option<String>, TaskError> {
        read_text(self.handle(), Property::Id)
    }

    pub fn set_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle().put_text(Property::Id, value)?)
    }
}

/// Starts a program
#[derive(Debug, Clone)]
pub struct ExecAction {
    handle: ObjectRef,
}

impl ExecAction {
    pub fn path(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::Path)?)
    }

    pub fn set_path(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Path, value)?)
    }

    pub fn arguments(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Arguments)
    }

    pub fn set_arguments(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Arguments, value)?)
    }

    pub fn working_directory(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::WorkingDirectory)
    }

    pub fn set_working_directory(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::WorkingDirectory, value)?)
    }
}

/// Fires a registered COM handler
#[derive(Debug, Clone)]
pub struct ComHandlerAction {
    handle: ObjectRef,
}

impl ComHandlerAction {
    pub fn class_id(&self) -> Result<String, TaskError> {
        Ok(self.handle.text(Property::ClassId)?)
    }

    pub fn set_class_id(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::ClassId, value)?)
    }

    /// Extra data passed to the handler
    pub fn data(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Data)
    }

    pub fn set_data(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Data, value)?)
    }
}

/// Sends an email. Deprecated by the service
#[derive(Debug, Clone)]
pub struct EmailAction {
    handle: ObjectRef,
}

impl EmailAction {
    pub fn server(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Server)
    }

    pub fn set_server(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Server, value)?)
    }

    pub fn from(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::From)
    }

    pub fn set_from(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::From, value)?)
    }

    pub fn to(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::To)
    }

    pub fn set_to(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::To, value)?)
    }

    pub fn cc(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Cc)
    }

    pub fn set_cc(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Cc, value)?)
    }

    pub fn bcc(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Bcc)
    }

    pub fn set_bcc(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Bcc, value)?)
    }

    pub fn reply_to(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::ReplyTo)
    }

    pub fn set_reply_to(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::ReplyTo, value)?)
    }

    pub fn subject(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Subject)
    }

    pub fn set_subject(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Subject, value)?)
    }

    pub fn body(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Body)
    }

    pub fn set_body(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Body, value)?)
    }

    /// Paths of files attached to the email
    pub fn attachments(&self) -> Result<Vec<String>, TaskError> {
        Ok(self.handle.texts(Property::Attachments)?)
    }

    pub fn set_attachments(&self, values: &[String]) -> Result<(), TaskError> {
        Ok(self.handle.put_texts(Property::Attachments, values)?)
    }

    pub fn header_fields(&self) -> Result<TaskNamedValueCollection, TaskError> {
        let handle = self.handle.get_object(Property::HeaderFields)?;
        Ok(TaskNamedValueCollection::new(handle))
    }
}

/// Shows a message box. Deprecated by the service
#[derive(Debug, Clone)]
pub struct ShowMessageAction {
    handle: ObjectRef,
}

impl ShowMessageAction {
    pub fn title(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Title)
    }

    pub fn set_title(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Title, value)?)
    }

    pub fn message_body(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::MessageBody)
    }

    pub fn set_message_body(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::MessageBody, value)?)
    }
}

/// Actions of a task definition
#[derive(Debug, Clone)]
pub struct ActionCollection {
    handle: ObjectRef,
}

impl ActionCollection {
    pub(crate) fn new(handle: ObjectRef) -> ActionCollection {
        ActionCollection { handle }
    }

    /// Identifier of the principal the actions run as
    pub fn context(&self) -> Result<Option<String>, TaskError> {
        read_text(&self.handle, Property::Context)
    }

    pub fn set_context(&self, value: &str) -> Result<(), TaskError> {
        Ok(self.handle.put_text(Property::Context, value)?)
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

    /// Action at a 0-based index
    pub fn item(&self, index: usize) -> Result<Action, TaskError> {
        wrap_action(collection::item(&self.handle, index)?)
    }

    pub fn to_vec(&self) -> Result<Vec<Action>, TaskError> {
        let mut actions = Vec::new();
        for handle in collection::items(&self.handle)? {
            actions.push(wrap_action(handle)?);
        }
        Ok(actions)
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<Action>, TaskError> {
        Ok(self.to_vec()?.into_iter())
    }

    /// Add a new action of the provided kind
    pub fn create(&self, kind: ActionKind) -> Result<Action, TaskError> {
        let constructor = resolve_action_variant(kind)?;
        let handle = self.handle.call(Method::Create(kind.as_raw()))?.into_object()?;
        Ok(constructor(handle))
    }

    pub fn remove(&self, index: usize) -> Result<(), TaskError> {
        collection::remove(&self.handle, index)
    }

    pub fn clear(&self) -> Result<(), TaskError> {
        collection::clear(&self.handle)
    }
}
