//! Minimal render-script interpreter.
//!
//! Runs the statements the built-in tags emit against a JSON context so tests
//! can assert on rendered output instead of generated code.

use serde_json::{Map, Value};

#[derive(Debug, Clone)]
enum Sexp {
	Atom(String),
	Str(String),
	List(Vec<Sexp>),
}

fn read_all(src: &str) -> Vec<Sexp> {
	let mut reader = Reader {
		chars: src.chars().collect(),
		pos: 0,
	};
	let mut out = Vec::new();
	while let Some(sexp) = reader.read() {
		out.push(sexp);
	}
	out
}

struct Reader {
	chars: Vec<char>,
	pos: usize,
}

impl Reader {
	fn skip_ws(&mut self) {
		while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
			self.pos += 1;
		}
	}

	fn read(&mut self) -> Option<Sexp> {
		self.skip_ws();
		let ch = *self.chars.get(self.pos)?;
		match ch {
			'(' => {
				self.pos += 1;
				let mut items = Vec::new();
				loop {
					self.skip_ws();
					if self.chars.get(self.pos) == Some(&')') {
						self.pos += 1;
						return Some(Sexp::List(items));
					}
					items.push(self.read().expect("unterminated list"));
				}
			}
			'"' => {
				let start = self.pos;
				self.pos += 1;
				while self.chars[self.pos] != '"' {
					if self.chars[self.pos] == '\\' {
						self.pos += 1;
					}
					self.pos += 1;
				}
				self.pos += 1;
				let literal: String = self.chars[start..self.pos].iter().collect();
				Some(Sexp::Str(serde_json::from_str(&literal).expect("string literal")))
			}
			_ => {
				let start = self.pos;
				while self.pos < self.chars.len()
					&& !self.chars[self.pos].is_whitespace()
					&& !matches!(self.chars[self.pos], '(' | ')')
				{
					self.pos += 1;
				}
				Some(Sexp::Atom(self.chars[start..self.pos].iter().collect()))
			}
		}
	}
}

#[derive(Debug)]
enum Stmt {
	Text(String),
	Echo(Sexp),
	Set(Sexp, Sexp),
	If(Vec<(Option<Sexp>, Vec<Stmt>)>),
	Foreach {
		list: Sexp,
		key: Option<String>,
		value: String,
		body: Vec<Stmt>,
		otherwise: Vec<Stmt>,
	},
	For {
		var: String,
		from: Sexp,
		to: Sexp,
		step: Sexp,
		body: Vec<Stmt>,
		otherwise: Vec<Stmt>,
	},
	While(Sexp, Vec<Stmt>),
	Switch(Sexp, Vec<Stmt>),
	Case(Sexp),
	Default,
	Break,
	Continue,
}

struct Line {
	op: String,
	args: Vec<Sexp>,
}

fn atom(sexp: &Sexp) -> String {
	match sexp {
		Sexp::Atom(a) => a.clone(),
		other => panic!("expected an atom, got {other:?}"),
	}
}

struct Parser {
	lines: Vec<Line>,
	pos: usize,
}

impl Parser {
	fn body(&mut self, stops: &[&str]) -> (Vec<Stmt>, Option<Line>) {
		let mut out = Vec::new();
		while self.pos < self.lines.len() {
			let line = std::mem::replace(
				&mut self.lines[self.pos],
				Line {
					op: String::new(),
					args: Vec::new(),
				},
			);
			self.pos += 1;
			if stops.contains(&line.op.as_str()) {
				return (out, Some(line));
			}
			let mut args = line.args.into_iter();
			let mut arg = || args.next().expect("missing argument");
			out.push(match line.op.as_str() {
				"text" => match arg() {
					Sexp::Str(s) => Stmt::Text(s),
					other => panic!("text expects a string, got {other:?}"),
				},
				"echo" => Stmt::Echo(arg()),
				"set" => Stmt::Set(arg(), arg()),
				"if" => {
					let mut arms = Vec::new();
					let mut cond = Some(arg());
					loop {
						let (body, stop) = self.body(&["elseif", "else", "end"]);
						arms.push((cond, body));
						let stop = stop.expect("unterminated if");
						match stop.op.as_str() {
							"elseif" => cond = stop.args.into_iter().next(),
							"else" => cond = None,
							_ => break,
						}
					}
					Stmt::If(arms)
				}
				"foreach" => {
					let list = arg();
					let key = Some(atom(&arg())).filter(|k| k != "_");
					let value = atom(&arg());
					let (body, otherwise) = self.with_else("foreachelse");
					Stmt::Foreach {
						list,
						key,
						value,
						body,
						otherwise,
					}
				}
				"for" => {
					let var = atom(&arg());
					let (from, to, step) = (arg(), arg(), arg());
					let (body, otherwise) = self.with_else("forelse");
					Stmt::For {
						var,
						from,
						to,
						step,
						body,
						otherwise,
					}
				}
				"while" => Stmt::While(arg(), self.body(&["end"]).0),
				"switch" => Stmt::Switch(arg(), self.body(&["end"]).0),
				"case" => Stmt::Case(arg()),
				"default" => Stmt::Default,
				"break" => Stmt::Break,
				"continue" => Stmt::Continue,
				op => panic!("unsupported statement {op:?}"),
			});
		}
		(out, None)
	}

	fn with_else(&mut self, else_tag: &str) -> (Vec<Stmt>, Vec<Stmt>) {
		let (body, stop) = self.body(&[else_tag, "end"]);
		let otherwise = match stop {
			Some(line) if line.op == else_tag => self.body(&["end"]).0,
			_ => Vec::new(),
		};
		(body, otherwise)
	}
}

fn parse(code: &str) -> Vec<Stmt> {
	let lines = code
		.lines()
		.filter(|l| !l.starts_with('@') && !l.is_empty())
		.map(|l| {
			let (op, rest) = l.split_once(' ').unwrap_or((l, ""));
			Line {
				op: op.to_string(),
				args: read_all(rest),
			}
		})
		.collect();
	Parser { lines, pos: 0 }.body(&[]).0
}

#[derive(Debug, PartialEq)]
enum Flow {
	Normal,
	Break,
	Continue,
}

struct Vm {
	vars: Map<String, Value>,
	out: String,
}

/// Renders compiled `code` with `vars` (a JSON object) as the variables.
pub fn render(code: &str, vars: Value) -> String {
	let Value::Object(vars) = vars else {
		panic!("variables must be an object");
	};
	let mut vm = Vm {
		vars,
		out: String::new(),
	};
	let flow = vm.exec(&parse(code));
	assert_eq!(flow, Flow::Normal, "break or continue outside a loop");
	vm.out
}

pub fn truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty() && s != "0",
		Value::Array(a) => !a.is_empty(),
		Value::Object(o) => !o.is_empty(),
	}
}

fn display(value: &Value) -> String {
	match value {
		Value::Null | Value::Bool(false) => String::new(),
		Value::Bool(true) => "1".to_string(),
		Value::String(s) => s.clone(),
		Value::Number(n) => n.to_string(),
		Value::Array(_) => "Array".to_string(),
		Value::Object(_) => "Object".to_string(),
	}
}

fn number(value: &Value) -> f64 {
	match value {
		Value::Number(n) => n.as_f64().unwrap_or(0.0),
		Value::String(s) => s.parse().unwrap_or(0.0),
		Value::Bool(b) => f64::from(u8::from(*b)),
		_ => 0.0,
	}
}

fn from_number(f: f64) -> Value {
	if f.fract() == 0.0 && f.abs() < 9.0e15 {
		Value::from(f as i64)
	} else {
		Value::from(f)
	}
}

fn loose_eq(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Number(_), _) | (_, Value::Number(_)) => number(a) == number(b),
		_ => a == b,
	}
}

impl Vm {
	fn exec(&mut self, stmts: &[Stmt]) -> Flow {
		for stmt in stmts {
			match stmt {
				Stmt::Text(text) => self.out.push_str(text),
				Stmt::Echo(expr) => {
					let value = self.eval(expr);
					self.out.push_str(&display(&value));
				}
				Stmt::Set(target, expr) => {
					let value = self.eval(expr);
					self.assign(target, value);
				}
				Stmt::If(arms) => {
					for (cond, body) in arms {
						if cond.as_ref().is_none_or(|c| truthy(&self.eval(c))) {
							let flow = self.exec(body);
							if flow != Flow::Normal {
								return flow;
							}
							break;
						}
					}
				}
				Stmt::Foreach {
					list,
					key,
					value,
					body,
					otherwise,
				} => {
					let items: Vec<(Value, Value)> = match self.eval(list) {
						Value::Array(items) => items
							.into_iter()
							.enumerate()
							.map(|(i, v)| (Value::from(i), v))
							.collect(),
						Value::Object(map) => {
							map.into_iter().map(|(k, v)| (Value::from(k), v)).collect()
						}
						_ => Vec::new(),
					};
					if items.is_empty() {
						let flow = self.exec(otherwise);
						if flow != Flow::Normal {
							return flow;
						}
					}
					for (k, v) in items {
						if let Some(key) = key {
							self.vars.insert(key.clone(), k);
						}
						self.vars.insert(value.clone(), v);
						if self.exec(body) == Flow::Break {
							break;
						}
					}
				}
				Stmt::For {
					var,
					from,
					to,
					step,
					body,
					otherwise,
				} => {
					let (mut i, to, step) = (
						number(&self.eval(from)),
						number(&self.eval(to)),
						number(&self.eval(step)),
					);
					let within = |i: f64| if step > 0.0 { i <= to } else { i >= to };
					if !within(i) {
						let flow = self.exec(otherwise);
						if flow != Flow::Normal {
							return flow;
						}
					}
					while within(i) {
						self.vars.insert(var.clone(), from_number(i));
						if self.exec(body) == Flow::Break {
							break;
						}
						i += step;
					}
				}
				Stmt::While(cond, body) => {
					while truthy(&self.eval(cond)) {
						if self.exec(body) == Flow::Break {
							break;
						}
					}
				}
				Stmt::Switch(subject, body) => {
					let subject = self.eval(subject);
					let start = body
						.iter()
						.position(|s| matches!(s, Stmt::Case(c) if loose_eq(&self.eval(c), &subject)))
						.or_else(|| body.iter().position(|s| matches!(s, Stmt::Default)));
					if let Some(start) = start
						&& self.exec(&body[start..]) == Flow::Continue
					{
						return Flow::Continue;
					}
				}
				Stmt::Case(_) | Stmt::Default => {}
				Stmt::Break => return Flow::Break,
				Stmt::Continue => return Flow::Continue,
			}
		}
		Flow::Normal
	}

	fn assign(&mut self, target: &Sexp, value: Value) {
		match target {
			Sexp::List(items) if matches!(&items[..], [Sexp::Atom(head), Sexp::Atom(_)] if head == "var") => {
				self.vars.insert(atom(&items[1]), value);
			}
			other => panic!("unsupported assignment target {other:?}"),
		}
	}

	fn eval(&self, expr: &Sexp) -> Value {
		let items = match expr {
			Sexp::Str(s) => return Value::from(s.clone()),
			Sexp::Atom(a) => {
				return match a.as_str() {
					"true" => Value::Bool(true),
					"false" => Value::Bool(false),
					"null" => Value::Null,
					n => from_number(n.parse().expect("numeric literal")),
				};
			}
			Sexp::List(items) => items,
		};
		let head = atom(&items[0]);
		let args = &items[1..];
		let arg = |i: usize| self.eval(&args[i]);
		match (head.as_str(), args.len()) {
			("var", 1) => self.vars.get(&atom(&args[0])).cloned().unwrap_or(Value::Null),
			("get", 2) => match (arg(0), arg(1)) {
				(Value::Array(a), k) => a.get(number(&k) as usize).cloned().unwrap_or(Value::Null),
				(Value::Object(o), k) => o.get(&display(&k)).cloned().unwrap_or(Value::Null),
				_ => Value::Null,
			},
			("list", _) => Value::Array((0..args.len()).map(arg).collect()),
			("?", 3) => {
				if truthy(&arg(0)) {
					arg(1)
				} else {
					arg(2)
				}
			}
			("?:", 2) => {
				let v = arg(0);
				if truthy(&v) { v } else { arg(1) }
			}
			("!", 1) => Value::Bool(!truthy(&arg(0))),
			("-", 1) => from_number(-number(&arg(0))),
			("fn" | "mod", _) => self.call(&atom(&args[0]), (1..args.len()).map(arg).collect()),
			(op, 2) => binary(op, &arg(0), &arg(1)),
			(op, n) => panic!("unsupported form ({op}) with {n} arguments"),
		}
	}

	fn call(&self, function: &str, args: Vec<Value>) -> Value {
		match (function, args.as_slice()) {
			("strtoupper", [v]) => Value::from(display(v).to_uppercase()),
			("strtolower", [v]) => Value::from(display(v).to_lowercase()),
			("count", [Value::Array(a)]) => Value::from(a.len()),
			("count", [Value::Object(o)]) => Value::from(o.len()),
			("Modifier::default_value", [v, fallback]) => {
				if truthy(v) { v.clone() } else { fallback.clone() }
			}
			("Modifier::truncate", [v, len, ..]) => {
				Value::from(display(v).chars().take(number(len) as usize).collect::<String>())
			}
			(f, _) => panic!("unsupported function {f}"),
		}
	}
}

fn binary(op: &str, a: &Value, b: &Value) -> Value {
	match op {
		"+" => from_number(number(a) + number(b)),
		"-" => from_number(number(a) - number(b)),
		"*" => from_number(number(a) * number(b)),
		"/" => from_number(number(a) / number(b)),
		"%" => from_number(number(a) % number(b)),
		"." => Value::from(display(a) + &display(b)),
		"==" => Value::Bool(loose_eq(a, b)),
		"!=" => Value::Bool(!loose_eq(a, b)),
		"===" => Value::Bool(a == b),
		"!==" => Value::Bool(a != b),
		"<" => Value::Bool(number(a) < number(b)),
		"<=" => Value::Bool(number(a) <= number(b)),
		">" => Value::Bool(number(a) > number(b)),
		">=" => Value::Bool(number(a) >= number(b)),
		"&&" | "and" => Value::Bool(truthy(a) && truthy(b)),
		"||" | "or" => Value::Bool(truthy(a) || truthy(b)),
		other => panic!("unsupported operator {other}"),
	}
}
