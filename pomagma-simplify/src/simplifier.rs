//! Space-delimited prefix-expression reducer. Reduces a token stream against a [`Structure`] acting as the truth
//! oracle for ground subterms, returning the resulting ob (0 if not ground) and a "route" string —
//! the shortest known expression for that ob, or the residual unreduced expression.

use std::iter::Peekable;
use std::str::SplitWhitespace;

use pomagma_structure::Structure;
use pomagma_util::Ob;

/// The distinguished route returned for a proven-true ground relation.
pub const SEMI_TRUE: &str = "I";
/// The distinguished route returned for a proven-false ground relation.
pub const SEMI_FALSE: &str = "BOT";

/// Supplies the shortest known syntactic route to an ob, as computed by the Router (pomagma-
/// analysis). Kept as a trait here rather than a dependency on pomagma-analysis so the two crates
/// don't need to know about each other; `pomagma-cli` wires a concrete Router into a Simplifier.
pub trait RouteTable: Send + Sync {
    fn route(&self, ob: Ob) -> String;
}

/// A fallback `RouteTable` that has no routing information: every ob routes to its own decimal
/// value. Useful for testing or before a Router has run.
pub struct NoRoutes;

impl RouteTable for NoRoutes {
    fn route(&self, ob: Ob) -> String {
        ob.to_string()
    }
}

/// The result of reducing one subterm: its ob if the subterm is ground (0 otherwise), and its
/// route (an already-shortest expression when `ob != 0`, or the residual unreduced expression
/// otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced {
    pub ob: Ob,
    pub route: String,
}

impl Reduced {
    fn ground(ob: Ob, route: String) -> Self {
        Reduced { ob, route }
    }

    fn residual(route: String) -> Self {
        Reduced { ob: 0, route }
    }

    fn semi_true() -> Self {
        Reduced::residual(SEMI_TRUE.to_string())
    }

    fn semi_false() -> Self {
        Reduced::residual(SEMI_FALSE.to_string())
    }
}

pub struct Simplifier<'a> {
    structure: &'a Structure,
    routes: &'a dyn RouteTable,
}

impl<'a> Simplifier<'a> {
    pub fn new(structure: &'a Structure, routes: &'a dyn RouteTable) -> Self {
        Simplifier { structure, routes }
    }

    /// Reduces a space-delimited prefix expression. Unknown tokens are recorded in the returned
    /// error log and passed through as opaque single-token residuals.
    pub fn simplify(&self, expr: &str) -> (Reduced, Vec<String>) {
        let mut errors = Vec::new();
        let mut tokens = expr.split_whitespace().peekable();
        let result = self.reduce(&mut tokens, &mut errors);
        if tokens.peek().is_some() {
            errors.push(format!(
                "trailing tokens after expression: {}",
                tokens.collect::<Vec<_>>().join(" ")
            ));
        }
        (result, errors)
    }

    fn reduce(&self, tokens: &mut Peekable<SplitWhitespace<'_>>, errors: &mut Vec<String>) -> Reduced {
        let Some(token) = tokens.next() else {
            errors.push("premature end of expression".to_string());
            return Reduced::residual(String::new());
        };

        match token {
            "HOLE" => Reduced::residual("HOLE".to_string()),
            "VAR" => {
                let Some(name) = tokens.next() else {
                    errors.push("VAR with no name".to_string());
                    return Reduced::residual("VAR".to_string());
                };
                Reduced::residual(format!("VAR {name}"))
            }
            "EQUAL" => self.reduce_equal(tokens, errors),
            name => self.reduce_named(name, tokens, errors),
        }
    }

    fn reduce_equal(&self, tokens: &mut Peekable<SplitWhitespace<'_>>, errors: &mut Vec<String>) -> Reduced {
        let lhs = self.reduce(tokens, errors);
        let rhs = self.reduce(tokens, errors);

        if lhs.ob != 0 && rhs.ob != 0 {
            if lhs.ob == rhs.ob {
                return Reduced::semi_true();
            }
            if self.proven_apart(lhs.ob, rhs.ob) {
                return Reduced::semi_false();
            }
        }
        if lhs.route == rhs.route {
            return Reduced::semi_true();
        }
        Reduced::residual(format!("EQUAL {} {}", lhs.route, rhs.route))
    }

    /// Two ground obs are provably distinct if `NLESS` holds in either direction (antisymmetry of
    /// `LESS` means equality requires both `a <= b` and `b <= a`).
    fn proven_apart(&self, lhs: Ob, rhs: Ob) -> bool {
        let Some(nless) = self.structure.signature().binary_relation("NLESS") else {
            return false;
        };
        nless.find(lhs, rhs) || nless.find(rhs, lhs)
    }

    fn reduce_named(
        &self,
        name: &str,
        tokens: &mut Peekable<SplitWhitespace<'_>>,
        errors: &mut Vec<String>,
    ) -> Reduced {
        let sig = self.structure.signature();

        if let Some(fun) = sig.nullary_function(name) {
            let ob = fun.find();
            return if ob != 0 {
                Reduced::ground(ob, self.routes.route(ob))
            } else {
                Reduced::residual(name.to_string())
            };
        }
        if let Some(fun) = sig.injective_function(name) {
            let arg = self.reduce(tokens, errors);
            if arg.ob != 0 {
                let val = fun.find(arg.ob);
                if val != 0 {
                    return Reduced::ground(val, self.routes.route(val));
                }
            }
            return Reduced::residual(format!("{name} {}", arg.route));
        }
        if let Some(fun) = sig.binary_function(name) {
            let lhs = self.reduce(tokens, errors);
            let rhs = self.reduce(tokens, errors);
            if lhs.ob != 0 && rhs.ob != 0 {
                let val = fun.find(lhs.ob, rhs.ob);
                if val != 0 {
                    return Reduced::ground(val, self.routes.route(val));
                }
            }
            return Reduced::residual(format!("{name} {} {}", lhs.route, rhs.route));
        }
        if let Some(fun) = sig.symmetric_function(name) {
            let lhs = self.reduce(tokens, errors);
            let rhs = self.reduce(tokens, errors);
            if lhs.ob != 0 && rhs.ob != 0 {
                let val = fun.find(lhs.ob, rhs.ob);
                if val != 0 {
                    return Reduced::ground(val, self.routes.route(val));
                }
            }
            return Reduced::residual(format!("{name} {} {}", lhs.route, rhs.route));
        }
        if let Some(rel) = sig.unary_relation(name) {
            let arg = self.reduce(tokens, errors);
            if arg.ob != 0 {
                if rel.find(arg.ob) {
                    return Reduced::semi_true();
                }
                if let Some(neg_name) = sig.negate(name) {
                    if let Some(neg) = sig.unary_relation(neg_name) {
                        if neg.find(arg.ob) {
                            return Reduced::semi_false();
                        }
                    }
                }
            }
            return Reduced::residual(format!("{name} {}", arg.route));
        }
        if let Some(rel) = sig.binary_relation(name) {
            let lhs = self.reduce(tokens, errors);
            let rhs = self.reduce(tokens, errors);
            if lhs.ob != 0 && rhs.ob != 0 {
                if rel.find(lhs.ob, rhs.ob) {
                    return Reduced::semi_true();
                }
                if let Some(neg_name) = sig.negate(name) {
                    if let Some(neg) = sig.binary_relation(neg_name) {
                        if neg.find(lhs.ob, rhs.ob) {
                            return Reduced::semi_false();
                        }
                    }
                }
            }
            return Reduced::residual(format!("{name} {} {}", lhs.route, rhs.route));
        }

        errors.push(format!("unknown token: {name}"));
        Reduced::residual(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomagma_structure::Structure;

    struct FixedRoutes(std::collections::HashMap<Ob, String>);
    impl RouteTable for FixedRoutes {
        fn route(&self, ob: Ob) -> String {
            self.0.get(&ob).cloned().unwrap_or_else(|| ob.to_string())
        }
    }

    #[test]
    fn reduces_app_i_x_to_xs_route() {
        let mut structure = Structure::new(10);
        for _ in 0..4 {
            structure.carrier().unsafe_insert();
        }
        let i_ob = 1;
        let x_ob = 2;
        structure.signature_mut().declare_nullary_function("I").insert(i_ob);
        structure.signature_mut().declare_nullary_function("x").insert(x_ob);
        let app = structure.signature_mut().declare_binary_function("APP");
        app.insert(i_ob, x_ob, x_ob);

        let mut routes = std::collections::HashMap::new();
        routes.insert(i_ob, "I".to_string());
        routes.insert(x_ob, "x".to_string());
        let routes = FixedRoutes(routes);

        let simplifier = Simplifier::new(&structure, &routes);
        let (reduced, errors) = simplifier.simplify("APP I x");
        assert!(errors.is_empty());
        assert_eq!(reduced.route, "x");
        assert_eq!(reduced.ob, x_ob);
    }

    #[test]
    fn non_ground_application_reconstructs_residual_route() {
        let mut structure = Structure::new(10);
        let i_ob = 1;
        structure.signature_mut().declare_nullary_function("I").insert(i_ob);
        structure.signature_mut().declare_binary_function("APP");

        let mut routes = std::collections::HashMap::new();
        routes.insert(i_ob, "I".to_string());
        let routes = FixedRoutes(routes);

        let simplifier = Simplifier::new(&structure, &routes);
        let (reduced, errors) = simplifier.simplify("APP I HOLE");
        assert!(errors.is_empty());
        assert_eq!(reduced.route, "APP I HOLE");
        assert_eq!(reduced.ob, 0);
    }

    #[test]
    fn unknown_token_is_logged_and_passed_through() {
        let structure = Structure::new(10);
        let routes = NoRoutes;
        let simplifier = Simplifier::new(&structure, &routes);
        let (reduced, errors) = simplifier.simplify("BOGUS");
        assert_eq!(reduced.route, "BOGUS");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn equal_of_identical_ground_terms_is_semi_true() {
        let mut structure = Structure::new(10);
        for _ in 0..2 {
            structure.carrier().unsafe_insert();
        }
        let f = structure.signature_mut().declare_nullary_function("F");
        f.insert(1);
        let routes = NoRoutes;
        let simplifier = Simplifier::new(&structure, &routes);
        let (reduced, _) = simplifier.simplify("EQUAL F F");
        assert_eq!(reduced.route, SEMI_TRUE);
    }
}
