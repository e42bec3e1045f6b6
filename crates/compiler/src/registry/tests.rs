use aspect_lexer::Tokens;
use pretty_assertions::assert_eq;

use super::*;
use crate::compiler::Compiler;
use crate::context::Context;
use crate::error::{CompileErrorKind, HandlerResult};

fn now(_: &mut Tokens, _: &Context<'_>) -> HandlerResult {
	Ok("echo (fn time)".to_string())
}

fn shout(tokens: &mut Tokens, cx: &Context<'_>) -> HandlerResult {
	Ok(format!("echo (fn strtoupper {})", cx.expression(tokens)?))
}

fn compile(registry: &Registry, source: &str) -> Result<String, CompileErrorKind> {
	Compiler::new(registry, Options::empty())
		.compile("t", source)
		.map(|c| c.code)
		.map_err(|e| e.kind)
}

#[test]
fn standard_registry_kinds() {
	let registry = Registry::standard();
	let kind = |name: &str| registry.lookup(name).map(Action::kind);
	assert_eq!(kind("foreach"), Some(ActionKind::BlockCompiler));
	assert_eq!(kind("var"), Some(ActionKind::InlineCompiler));
	assert_eq!(kind("capture"), Some(ActionKind::BlockFunction));
	assert_eq!(kind("mailto"), Some(ActionKind::InlineFunction));
	assert_eq!(kind("elseif"), None);
}

#[test]
fn owners_are_sorted() {
	let registry = Registry::standard();
	assert_eq!(registry.owners_of("break"), vec!["for", "foreach", "switch", "while"]);
	assert_eq!(registry.owners_of("elseif"), vec!["if"]);
	assert!(registry.owners_of("nothing").is_empty());
}

#[test]
fn floating_tags_are_per_owner() {
	let registry = Registry::standard();
	let foreach = registry.lookup("foreach").unwrap();
	assert!(foreach.is_floating("break"));
	assert!(!foreach.is_floating("foreachelse"));
	assert!(!registry.lookup("if").unwrap().is_floating("else"));
}

#[test]
fn call_permissions_follow_options() {
	let registry = Registry::standard();
	assert!(registry.is_call_allowed("count", Options::DENY_INLINE_FUNCS));
	assert!(registry.is_call_allowed("strtoupper", Options::empty()));
	assert!(!registry.is_call_allowed("strtoupper", Options::DENY_INLINE_FUNCS));
	assert!(!registry.is_call_allowed("exec", Options::empty()));
}

#[test]
fn modifiers_resolve_to_symbols() {
	let registry = Registry::standard();
	let options = Options::empty();
	assert_eq!(registry.modifier("upper", options), Ok("strtoupper"));
	assert_eq!(registry.modifier("e", options), Ok("Modifier::escape"));
	assert_eq!(registry.modifier("count", options), Ok("count"));
	assert_eq!(registry.modifier("nl2br", Options::DENY_INLINE_FUNCS), Ok("nl2br"));
	assert_eq!(
		registry.modifier("missing", options),
		Err(CompileErrorKind::UnknownModifier {
			name: "missing".to_string()
		})
	);
}

#[test]
fn restricted_host_modifiers_are_disallowed() {
	let registry = Registry::standard();
	assert_eq!(registry.modifier("trim", Options::empty()), Ok("trim"));
	assert_eq!(
		registry.modifier("trim", Options::DENY_INLINE_FUNCS),
		Err(CompileErrorKind::DisallowedCall {
			name: "trim".to_string()
		})
	);
	assert_eq!(
		registry.modifier("upper", Options::DENY_INLINE_FUNCS),
		Ok("strtoupper")
	);
}

#[test]
fn suggestions_include_child_tags() {
	let registry = Registry::standard();
	assert_eq!(registry.suggest_tag("elsif").as_deref(), Some("elseif"));
	assert_eq!(registry.suggest_tag("zzzzzzzz"), None);
}

#[test]
fn custom_compilers_extend_and_replace() {
	let mut builder = RegistryBuilder::standard();
	builder.add_compiler("now", now).add_compiler("var", shout);
	let registry = builder.build();

	assert_eq!(compile(&registry, "{now}").unwrap(), "@1\necho (fn time)\n");
	assert_eq!(
		compile(&registry, "{var 'x'}").unwrap(),
		"@1\necho (fn strtoupper \"x\")\n"
	);
}

#[test]
fn smart_functions_take_positional_arguments() {
	let mut builder = RegistryBuilder::standard();
	builder
		.add_function_smart("greet", "Host::greet")
		.add_function("wave", "Host::wave", FunctionParser::Standard);
	let registry = builder.build();

	assert_eq!(
		compile(&registry, "{greet $name polite=true}").unwrap(),
		"@1\necho (call Host::greet (params (arg (var name)) (polite true)))\n"
	);
	match compile(&registry, "{wave $name}") {
		Err(CompileErrorKind::UnexpectedToken(err)) => {
			assert_eq!(err.expected.as_deref(), Some("name"));
		}
		other => panic!("expected a parse error, got {other:?}"),
	}
}

#[test]
fn block_functions_default_to_argument_capture() {
	let mut builder = RegistryBuilder::new();
	builder.add_block_function("spaceless", "Host::spaceless", None, None);
	let registry = builder.build();

	assert_eq!(
		compile(&registry, "{spaceless}a b{/spaceless}").unwrap(),
		"@1\nbegin\ntext \"a b\"\nfinish Host::spaceless (params)\n"
	);
}

#[test]
fn empty_registry_knows_no_tags() {
	let registry = Registry::builder().build();
	assert!(matches!(
		compile(&registry, "{if $a}{/if}"),
		Err(CompileErrorKind::UnknownTag { .. })
	));
	assert!(!registry.is_call_allowed("count", Options::empty()));
}
