//! JavaScript
//!
//! Vocabulary, lexical table and rule catalog for the JavaScript grammar. The grammar
//! labels the alternatives of `singleExpression` (and of `propertyAssignment`); each
//! label is its own production here, and [`SINGLE_EXPRESSIONS`] groups the former.

use crate::semhl::grammatical::RuleCatalog;
use crate::semhl::hcode::HCode;
use crate::semhl::lexical::LexicalTable;
use crate::semhl::overrides::{Hit, OverrideSet, Scan};
use crate::semhl::syntax::{NodeRef, RuleId, TokenKind};
use once_cell::sync::Lazy;

vocabulary! {
    /// JavaScript lexer token kinds.
    Token => TokenKind {
        HashBangLine, MultiLineComment, SingleLineComment, RegularExpressionLiteral,
        OpenBracket, CloseBracket, OpenParen, CloseParen, OpenBrace, TemplateCloseBrace,
        CloseBrace, SemiColon, Comma, Assign, QuestionMark, QuestionMarkDot, Colon, Ellipsis,
        Dot, PlusPlus, MinusMinus, Plus, Minus, BitNot, Not, Multiply, Divide, Modulus,
        Power, NullCoalesce, Hashtag, RightShiftArithmetic, LeftShiftArithmetic,
        RightShiftLogical, LessThan, MoreThan, LessThanEquals, GreaterThanEquals, Equals,
        NotEquals, IdentityEquals, IdentityNotEquals, BitAnd, BitXOr, BitOr, And, Or,
        MultiplyAssign, DivideAssign, ModulusAssign, PlusAssign, MinusAssign,
        LeftShiftArithmeticAssign, RightShiftArithmeticAssign, RightShiftLogicalAssign,
        BitAndAssign, BitXorAssign, BitOrAssign, PowerAssign, Arrow,
        NullLiteral, BooleanLiteral, DecimalLiteral, HexIntegerLiteral, OctalIntegerLiteral,
        OctalIntegerLiteral2, BinaryIntegerLiteral, BigHexIntegerLiteral,
        BigOctalIntegerLiteral, BigBinaryIntegerLiteral, BigDecimalIntegerLiteral,
        Break, Do, Instanceof, Typeof, Case, Else, New, Var, Catch, Finally, Return, Void,
        Continue, For, Switch, While, Debugger, Function, This, With, Default, If, Throw,
        Delete, In, Try, As, From, Class, Enum, Extends, Super, Const, Export, Import, Async,
        Await, Yield, Implements, StrictLet, NonStrictLet, Private, Public, Interface,
        Package, Protected, Static,
        Identifier, StringLiteral, BackTick, WhiteSpaces, LineTerminator, HtmlComment,
        CDataComment, UnexpectedCharacter, TemplateStringStartExpression,
        TemplateStringAtom,
    }
}

vocabulary! {
    /// JavaScript parser productions, with labeled alternatives split out.
    Rule => RuleId {
        Program, SourceElement, Statement, Block, StatementList, ImportStatement,
        ExportStatement, VariableStatement, VariableDeclarationList, VariableDeclaration,
        ExpressionStatement, IfStatement, ReturnStatement, FunctionDeclaration,
        ClassDeclaration, ClassTail, ClassElement, MethodDefinition, FormalParameterList,
        FormalParameterArg, FunctionBody, SourceElements, ArrayLiteral, ObjectLiteral,
        PropertyAssignment, PropertyExpressionAssignment, PropertyShorthand, PropertyName,
        Arguments, Argument, ExpressionSequence,
        // singleExpression alternatives
        FunctionExpression, ClassExpression, MemberIndexExpression, MemberDotExpression,
        NewExpression, ArgumentsExpression, ImportExpression, AssignmentExpression,
        ThisExpression, IdentifierExpression, SuperExpression, LiteralExpression,
        ArrayLiteralExpression, ObjectLiteralExpression, ParenthesizedExpression,
        AdditiveExpression, MultiplicativeExpression, EqualityExpression,
        LogicalAndExpression, LogicalOrExpression, TernaryExpression, UnaryMinusExpression,
        NotExpression, AwaitExpression, YieldExpression, TemplateStringExpression,
        Assignable, AnonymousFunction, ArrowFunctionParameters, ArrowFunctionBody, Literal,
        NumericLiteral, IdentifierName, Identifier, ReservedWord, Keyword, Getter, Setter,
        Eos,
    }
}

/// Every labeled alternative of `singleExpression`.
pub const SINGLE_EXPRESSIONS: [Rule; 26] = [
    Rule::FunctionExpression,
    Rule::ClassExpression,
    Rule::MemberIndexExpression,
    Rule::MemberDotExpression,
    Rule::NewExpression,
    Rule::ArgumentsExpression,
    Rule::ImportExpression,
    Rule::AssignmentExpression,
    Rule::ThisExpression,
    Rule::IdentifierExpression,
    Rule::SuperExpression,
    Rule::LiteralExpression,
    Rule::ArrayLiteralExpression,
    Rule::ObjectLiteralExpression,
    Rule::ParenthesizedExpression,
    Rule::AdditiveExpression,
    Rule::MultiplicativeExpression,
    Rule::EqualityExpression,
    Rule::LogicalAndExpression,
    Rule::LogicalOrExpression,
    Rule::TernaryExpression,
    Rule::UnaryMinusExpression,
    Rule::NotExpression,
    Rule::AwaitExpression,
    Rule::YieldExpression,
    Rule::TemplateStringExpression,
];

pub static LEXICAL: Lazy<LexicalTable> = Lazy::new(|| {
    use Token::*;
    LexicalTable::builder()
        .bucket(
            HCode::Keyword,
            [
                Assign, Break, Do, Instanceof, Typeof, Case, Else, New, Var, Catch, Finally,
                Return, Void, Continue, For, Switch, While, Debugger, Function, This, With,
                Default, If, Throw, Delete, In, Try, Class, Enum, Extends, Super, Const,
                Export, Import, Async, Await, Yield, Implements, StrictLet, NonStrictLet,
                Private, Public, Interface, Package, Protected, Static,
            ],
        )
        .bucket(
            HCode::Literal,
            [
                NullLiteral,
                BooleanLiteral,
                DecimalLiteral,
                HexIntegerLiteral,
                OctalIntegerLiteral,
                OctalIntegerLiteral2,
                BinaryIntegerLiteral,
                BigHexIntegerLiteral,
                BigOctalIntegerLiteral,
                BigBinaryIntegerLiteral,
                BigDecimalIntegerLiteral,
            ],
        )
        .bucket(HCode::CharStringLiteral, [StringLiteral, TemplateStringAtom])
        .bucket(
            HCode::Comment,
            [CDataComment, HtmlComment, MultiLineComment, SingleLineComment],
        )
        .soft_keywords(Rule::Identifier, [Async, Yield, NonStrictLet])
        .build()
});

fn parent_is(node: NodeRef<'_>, rule: Rule) -> bool {
    node.parent().is_some_and(|parent| parent.is_rule(rule))
}

pub struct JavaScriptRules;

impl RuleCatalog for JavaScriptRules {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn on_exit(&self, node: NodeRef<'_>, overrides: &mut OverrideSet) {
        let Some(rule) = node.rule().and_then(Rule::from_id) else {
            return;
        };
        match rule {
            Rule::ClassDeclaration => class_declaration(node, overrides),
            Rule::VariableDeclaration => {
                Scan::production(Rule::Assignable).first_only().assign(
                    node,
                    overrides,
                    rule,
                    HCode::VariableDeclarator,
                );
            }
            Rule::MethodDefinition => {
                Scan::production(Rule::PropertyName).assign(
                    node,
                    overrides,
                    rule,
                    HCode::FunctionDeclarator,
                );
            }
            // Every identifier beneath the declaration, parameters and body included.
            Rule::FunctionDeclaration => {
                Scan::production(Rule::Identifier).assign(
                    node,
                    overrides,
                    rule,
                    HCode::FunctionDeclarator,
                );
            }
            Rule::ClassTail => {
                Scan::productions(SINGLE_EXPRESSIONS).assign(
                    node,
                    overrides,
                    rule,
                    HCode::TypeIdentifier,
                );
            }
            Rule::PropertyExpressionAssignment => {
                Scan::production(Rule::PropertyName).assign(
                    node,
                    overrides,
                    rule,
                    HCode::FieldIdentifier,
                );
            }
            Rule::MemberDotExpression => member_dot_expression(node, overrides),
            Rule::ArgumentsExpression => {
                callee_identifiers(node, overrides, HCode::FunctionIdentifier)
            }
            Rule::NewExpression => callee_identifiers(node, overrides, HCode::TypeIdentifier),
            _ => {}
        }
    }
}

/// `function` seen before the name makes it a function declarator.
fn class_declaration(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let mut after_function = false;
    Scan::production(Rule::Identifier)
        .or_terminal(Token::Function)
        .first_only()
        .run(node, overrides, Rule::ClassDeclaration, |hit| match hit {
            Hit::Terminal(_) => {
                after_function = true;
                None
            }
            Hit::Production(_) if after_function => Some(HCode::FunctionDeclarator),
            Hit::Production(_) => Some(HCode::ClassDeclarator),
        });
}

fn member_dot_expression(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let origin = Rule::MemberDotExpression;
    if parent_is(node, Rule::ArgumentsExpression) || parent_is(node, Rule::NewExpression) {
        let constructed = parent_is(node, Rule::NewExpression);
        Scan::production(Rule::IdentifierName)
            .or_terminal(Token::Identifier)
            .first_only()
            .run(node, overrides, origin, |hit| match hit {
                Hit::Production(_) if constructed => Some(HCode::TypeIdentifier),
                Hit::Production(_) => Some(HCode::FunctionIdentifier),
                Hit::Terminal(_) => Some(HCode::TypeIdentifier),
            });
    } else if !parent_is(node, Rule::ImportExpression) {
        Scan::production(Rule::IdentifierName).assign(
            node,
            overrides,
            origin,
            HCode::FieldIdentifier,
        );
    }
}

/// Marks every Identifier token of each direct `identifier` callee.
fn callee_identifiers(node: NodeRef<'_>, overrides: &mut OverrideSet, hcode: HCode) {
    for expression in node.children_of(Rule::IdentifierExpression) {
        let Some(identifier) = expression.child(0).filter(|c| c.is_rule(Rule::Identifier)) else {
            continue;
        };
        Scan::terminal(Token::Identifier).assign(identifier, overrides, Rule::Identifier, hcode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::grammatical::{GrammaticalOverrideEngine, OverrideEngine};
    use crate::semhl::syntax::{ParseTree, TreeBuilder};

    fn overrides_of(tree: &ParseTree) -> Vec<(usize, HCode)> {
        let mut engine = OverrideEngine::new(JavaScriptRules);
        engine
            .walk(tree)
            .sorted()
            .into_iter()
            .map(|o| (o.start, o.hcode))
            .collect()
    }

    fn identifier(b: &mut TreeBuilder, text: &str) {
        b.start(Rule::Identifier)
            .token(Token::Identifier, text)
            .finish_node();
    }

    #[test]
    fn test_bare_call_is_function_identifier() {
        let mut b = TreeBuilder::new("run(1)");
        b.start(Rule::ArgumentsExpression)
            .start(Rule::IdentifierExpression);
        identifier(&mut b, "run");
        b.finish_node()
            .start(Rule::Arguments)
            .token(Token::OpenParen, "(")
            .start(Rule::LiteralExpression)
            .token(Token::DecimalLiteral, "1")
            .finish_node()
            .token(Token::CloseParen, ")")
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(0, HCode::FunctionIdentifier)]);
    }

    #[test]
    fn test_new_expression_is_type_identifier() {
        let mut b = TreeBuilder::new("new Map()");
        b.start(Rule::NewExpression)
            .token(Token::New, "new")
            .start(Rule::IdentifierExpression);
        identifier(&mut b, "Map");
        b.finish_node()
            .start(Rule::Arguments)
            .token(Token::OpenParen, "(")
            .token(Token::CloseParen, ")")
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(4, HCode::TypeIdentifier)]);
    }

    fn member(b: &mut TreeBuilder, object: &str, name: &str) {
        b.start(Rule::MemberDotExpression)
            .start(Rule::ThisExpression)
            .token(Token::This, object)
            .finish_node()
            .token(Token::Dot, ".")
            .start(Rule::IdentifierName);
        identifier(b, name);
        b.finish_node().finish_node();
    }

    #[test]
    fn test_member_access_is_field_identifier() {
        let mut b = TreeBuilder::new("this.size");
        b.start(Rule::ExpressionStatement);
        member(&mut b, "this", "size");
        b.finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(5, HCode::FieldIdentifier)]);
    }

    #[test]
    fn test_method_call_on_this_is_function_identifier() {
        let mut b = TreeBuilder::new("this.run()");
        b.start(Rule::ArgumentsExpression);
        member(&mut b, "this", "run");
        b.start(Rule::Arguments)
            .token(Token::OpenParen, "(")
            .token(Token::CloseParen, ")")
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(5, HCode::FunctionIdentifier)]);
    }

    #[test]
    fn test_class_declaration_name() {
        let mut b = TreeBuilder::new("class Shape {}");
        b.start(Rule::ClassDeclaration).token(Token::Class, "class");
        identifier(&mut b, "Shape");
        b.start(Rule::ClassTail)
            .token(Token::OpenBrace, "{")
            .token(Token::CloseBrace, "}")
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(6, HCode::ClassDeclarator)]);
    }

    #[test]
    fn test_function_keyword_turns_name_into_function_declarator() {
        let mut b = TreeBuilder::new("function make");
        b.start(Rule::ClassDeclaration)
            .token(Token::Function, "function");
        identifier(&mut b, "make");
        b.finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(9, HCode::FunctionDeclarator)]);
    }

    #[test]
    fn test_let_depends_on_context() {
        use crate::semhl::annotation::Eta;
        use crate::semhl::lexical::LexicalMode;

        let eta = |parent: Rule| Eta {
            start: 0,
            stop: 2,
            text: "let".to_string(),
            token_rule: Token::NonStrictLet.into(),
            parent_rule: Some(parent.into()),
            symbolic_name: "NonStrictLet".to_string(),
        };
        let keyword = LEXICAL.classify(eta(Rule::VariableStatement), LexicalMode::SemiLexical);
        assert_eq!(keyword.hcode, HCode::Keyword);
        assert_eq!(LEXICAL.lookup(Token::Assign.into()), HCode::Keyword);
    }
}
