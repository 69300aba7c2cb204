//! Event lists and the code shape of each event kind.

use super::context::CodeGenerationContext;
use super::diagnostics::DiagnosticKind;
use super::generator::EventsCodeGenerator;
use crate::model::{Event, EventKind, Expression, Instruction};
use crate::metadata::ValueType;

impl EventsCodeGenerator<'_> {
    /// Code of a list of events, each in its own block.
    ///
    /// Disabled events and comments produce nothing at all.
    pub fn generate_events_list_code(
        &mut self,
        events: &[Event],
        parent: &CodeGenerationContext<'_>,
    ) -> String {
        events
            .iter()
            .map(|event| self.generate_event_block(event, parent))
            .collect()
    }

    /// One event with the declarations of the lists it uses.
    pub fn generate_event_block(
        &mut self,
        event: &Event,
        parent: &CodeGenerationContext<'_>,
    ) -> String {
        if event.disabled || !event.is_executable() {
            return String::new();
        }
        let mut context = CodeGenerationContext::inherits_from(parent);
        let core = self.generate_event_code(event, &mut context);
        if core.is_empty() {
            return String::new();
        }
        let declarations = self.generate_objects_declaration_code(&context);
        self.target.block(&format!("{declarations}{core}"))
    }

    fn generate_event_code(
        &mut self,
        event: &Event,
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        match &event.kind {
            EventKind::Standard {
                conditions,
                actions,
                sub_events,
            } => self.conditions_and_actions_code(conditions, actions, sub_events, context),
            EventKind::Repeat {
                repeat_expression,
                conditions,
                actions,
                sub_events,
            } => self.repeat_code(repeat_expression, conditions, actions, sub_events, context),
            EventKind::While {
                while_conditions,
                conditions,
                actions,
                sub_events,
            } => self.while_code(while_conditions, conditions, actions, sub_events, context),
            EventKind::ForEach {
                object,
                conditions,
                actions,
                sub_events,
            } => self.for_each_code(object, conditions, actions, sub_events, context),
            EventKind::Group { sub_events, .. } => {
                self.generate_events_list_code(sub_events, context)
            }
            // Links are replaced by their events before generation.
            EventKind::Link { .. } | EventKind::Comment { .. } => String::new(),
        }
    }

    /// Conditions, then actions and sub-events when all of them are true.
    ///
    /// An unknown condition makes the whole event unknowable: it is skipped.
    fn conditions_and_actions_code(
        &mut self,
        conditions: &[Instruction],
        actions: &[Instruction],
        sub_events: &[Event],
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        if let Some(unknown) = self.first_unknown_condition(conditions) {
            let message = format!("unknown condition `{unknown}`, event skipped");
            self.report(DiagnosticKind::UnknownCondition, message);
            return String::new();
        }

        let conditions_code = self.generate_conditions_list_code(conditions, context, "condition");
        let mut body = self.generate_actions_list_code(actions, context);
        body.push_str(&self.generate_events_list_code(sub_events, context));

        let mut code = conditions_code.code.clone();
        match conditions_code.all_true() {
            Some(all_true) if !body.is_empty() => {
                code.push_str(&self.target.if_block(&all_true, &body))
            }
            Some(_) => {}
            None => code.push_str(&body),
        }
        code
    }

    fn repeat_code(
        &mut self,
        repeat_expression: &Expression,
        conditions: &[Instruction],
        actions: &[Instruction],
        sub_events: &[Event],
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let level = context.scope_level();
        let count_code = self.generate_expression_code(
            repeat_expression.plain_string(),
            ValueType::Number,
            context,
        );

        let mut child = CodeGenerationContext::inherits_from(context);
        let inner = self.conditions_and_actions_code(conditions, actions, sub_events, &mut child);
        let body = format!("{}{inner}", self.generate_objects_declaration_code(&child));

        self.target.repeat_loop(
            &format!("repeatCount{level}"),
            &format!("repeatIndex{level}"),
            &count_code,
            &body,
        )
    }

    /// Loops while the while-conditions hold. Without them the loop could
    /// never end, so nothing is generated.
    fn while_code(
        &mut self,
        while_conditions: &[Instruction],
        conditions: &[Instruction],
        actions: &[Instruction],
        sub_events: &[Event],
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        if while_conditions.is_empty() {
            return String::new();
        }
        if let Some(unknown) = self.first_unknown_condition(while_conditions) {
            let message = format!("unknown while condition `{unknown}`, event skipped");
            self.report(DiagnosticKind::UnknownCondition, message);
            return String::new();
        }

        let stop = format!("stopDoWhile{}", context.scope_level());
        let mut child = CodeGenerationContext::inherits_from(context);
        let loop_conditions =
            self.generate_conditions_list_code(while_conditions, &mut child, "whileCondition");
        let inner = self.conditions_and_actions_code(conditions, actions, sub_events, &mut child);

        let mut body = self.generate_objects_declaration_code(&child);
        body.push_str(&loop_conditions.code);
        let stop_now = format!("{stop} = true;\n");
        match loop_conditions.all_true() {
            Some(all_true) => body.push_str(&self.target.if_else_block(&all_true, &inner, &stop_now)),
            None => body.push_str(&stop_now),
        }

        let mut code = self.target.declare_boolean(&stop, false);
        code.push_str(&self.target.do_while(&stop, &body));
        code
    }

    /// Runs the event once per instance, with only that instance picked.
    fn for_each_code(
        &mut self,
        object: &str,
        conditions: &[Instruction],
        actions: &[Instruction],
        sub_events: &[Event],
        context: &mut CodeGenerationContext<'_>,
    ) -> String {
        let containers = self.containers();
        if !containers.has_object_or_group_named(object) {
            self.report(
                DiagnosticKind::UnknownObject,
                format!("for each on unknown object `{object}`, event skipped"),
            );
            return String::new();
        }
        let members = containers.expand_object_name(object, context.current_object());
        for member in &members {
            context.objects_list_needed(member);
        }

        let level = context.scope_level();
        let index = format!("forEachIndex{level}");
        let mut code = String::new();
        for member in &members {
            let iterated = self.list_name(context, member);

            let mut child = CodeGenerationContext::inherits_from(context);
            for other in &members {
                child.empty_objects_list_needed(other);
            }
            let inner = self.conditions_and_actions_code(conditions, actions, sub_events, &mut child);

            let mut body = String::new();
            for other in &members {
                body.push_str(&self.target.declare_empty_list(&self.list_name(&child, other)));
            }
            body.push_str(&self.target.push_instance(
                &self.list_name(&child, member),
                &self.target.instance(&iterated, &index),
            ));
            body.push_str(&self.generate_objects_declaration_code_except(&child, &members));
            body.push_str(&inner);

            code.push_str(&self.target.for_each_instance(&iterated, &index, &body));
        }
        code
    }
}
