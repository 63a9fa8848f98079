use super::{long_arg, text_arg};
use crate::host::{
    CallResult, Component, ComponentCatalog, Failure, OperationMeta, PrimitiveKind, Role,
    SharedComponent, TypeMeta, TypeRef, TypeRegistry, Value,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const USER: &str = "demo.user.User";
pub const TEAM: &str = "demo.user.Team";
pub const USER_REPOSITORY: &str = "demo.user.UserRepository";
pub const USER_SERVICE: &str = "demo.user.UserService";
pub const USER_SERVICE_IMPL: &str = "demo.user.UserServiceImpl";
pub const USER_CONTROLLER: &str = "demo.user.UserController";

const METRICS_COUNTER: &str = "ext.metrics.Counter";

fn long() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Long)
}

fn user() -> TypeRef {
    TypeRef::named(USER)
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    // User and Team reference each other.
    registry
        .register(
            TypeMeta::class(USER)
                .field("id", long())
                .field("name", TypeRef::Text)
                .field("team", TypeRef::named(TEAM)),
        )
        .register(
            TypeMeta::class(TEAM)
                .field("name", TypeRef::Text)
                .field("lead", user())
                .field("members", TypeRef::list()),
        )
        .register(
            TypeMeta::class(USER_REPOSITORY)
                .role(Role::Repository)
                .operation(OperationMeta::new("findById").param(long()).returns(user()))
                .operation(OperationMeta::new("save").param(user()).returns(user()))
                .operation(OperationMeta::new("count").returns(long())),
        )
        .register(
            TypeMeta::capability(USER_SERVICE)
                .operation(OperationMeta::new("getUser").param(long()).returns(user()))
                .operation(OperationMeta::new("register").param(TypeRef::Text).returns(user()))
                .operation(OperationMeta::new("countUsers").returns(long())),
        )
        .register(
            TypeMeta::class(USER_SERVICE_IMPL)
                .role(Role::Service)
                .implements(TypeRef::named(USER_SERVICE))
                .field("repository", TypeRef::named(USER_REPOSITORY))
                .field("registrations", TypeRef::named(METRICS_COUNTER)),
        )
        .register(
            TypeMeta::class(USER_CONTROLLER)
                .role(Role::RestController)
                .field("userService", TypeRef::named(USER_SERVICE))
                .operation(OperationMeta::new("getUser").param(long()).returns(user()))
                .operation(OperationMeta::new("register").param(TypeRef::Text).returns(user()))
                .operation(OperationMeta::new("count").returns(long())),
        );
}

pub(super) fn register_components(catalog: &mut ComponentCatalog) {
    catalog
        .wired(USER_REPOSITORY, |_| Ok(Arc::new(UserRepository::seeded())))
        .wired(USER_SERVICE_IMPL, |wiring| {
            Ok(Arc::new(UserServiceImpl {
                repository: wiring.collaborator(USER_REPOSITORY)?,
            }))
        })
        .wired(USER_CONTROLLER, |wiring| {
            Ok(Arc::new(UserController {
                user_service: wiring.collaborator(USER_SERVICE)?,
            }))
        });
}

fn user_value(id: i64, name: &str) -> Value {
    Value::object(USER, vec![("id", Value::Long(id)), ("name", Value::text(name))])
}

/// In-memory user table, seeded per container.
struct UserRepository {
    users: Mutex<BTreeMap<i64, Value>>,
}

impl UserRepository {
    fn seeded() -> Self {
        let users = [(1, "ada"), (2, "grace")]
            .into_iter()
            .map(|(id, name)| (id, user_value(id, name)))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

impl Component for UserRepository {
    fn type_name(&self) -> &str {
        USER_REPOSITORY
    }

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
        match operation.name.as_str() {
            "findById" => {
                let id = long_arg(&args, 0)?;
                Ok(self.users.lock().get(&id).cloned().unwrap_or(Value::Null))
            }
            "save" => {
                let user = args.into_iter().next().unwrap_or(Value::Null);
                let Value::Object { fields, .. } = &user else {
                    return Err(Failure::new("IllegalArgumentException", "not a user"));
                };
                let id = fields.get("id").and_then(Value::as_i64).ok_or_else(|| {
                    Failure::new("IllegalArgumentException", "user without id")
                })?;
                self.users.lock().insert(id, user.clone());
                Ok(user)
            }
            "count" => Ok(Value::Long(self.users.lock().len() as i64)),
            _ => Err(Failure::no_such_operation(USER_REPOSITORY, operation)),
        }
    }
}

struct UserServiceImpl {
    repository: SharedComponent,
}

impl Component for UserServiceImpl {
    fn type_name(&self) -> &str {
        USER_SERVICE_IMPL
    }

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
        match operation.name.as_str() {
            "getUser" => {
                let id = long_arg(&args, 0)?;
                let found = self
                    .repository
                    .invoke(&OperationMeta::new("findById").param(long()), vec![Value::Long(id)])?;
                if found.is_null() {
                    return Err(Failure::new(
                        "IllegalStateException",
                        format!("no user with id {}", id),
                    ));
                }
                Ok(found)
            }
            "register" => {
                let name = text_arg(&args, 0)?;
                if name.trim().is_empty() {
                    return Err(Failure::new("IllegalArgumentException", "name must not be blank"));
                }
                let count = self.repository.invoke(&OperationMeta::new("count"), vec![])?;
                let id = count.as_i64().unwrap_or_default() + 1;
                self.repository
                    .invoke(&OperationMeta::new("save").param(user()), vec![user_value(id, &name)])
            }
            "countUsers" => self.repository.invoke(&OperationMeta::new("count"), vec![]),
            _ => Err(Failure::no_such_operation(USER_SERVICE_IMPL, operation)),
        }
    }
}

struct UserController {
    user_service: SharedComponent,
}

impl Component for UserController {
    fn type_name(&self) -> &str {
        USER_CONTROLLER
    }

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
        let delegated = match operation.name.as_str() {
            "getUser" => OperationMeta::new("getUser").param(long()),
            "register" => OperationMeta::new("register").param(TypeRef::Text),
            "count" => OperationMeta::new("countUsers"),
            _ => return Err(Failure::no_such_operation(USER_CONTROLLER, operation)),
        };
        self.user_service.invoke(&delegated, args)
    }
}
