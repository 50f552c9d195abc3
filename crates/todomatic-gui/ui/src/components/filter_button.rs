use todomatic_core::Filter;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct FilterButtonProps {
  pub filter:    Filter,
  pub pressed:   bool,
  pub on_select: Callback<Filter>
}

#[function_component(FilterButton)]
pub fn filter_button(
  props: &FilterButtonProps
) -> Html {
  let filter = props.filter;
  let on_select =
    props.on_select.clone();

  html! {
      <button
          type="button"
          class="btn toggle-btn"
          aria-pressed={props.pressed.to_string()}
          onclick={move |_| on_select.emit(filter)}
      >
          <span class="visually-hidden">{ "Show " }</span>
          <span>{ filter.label() }</span>
          <span class="visually-hidden">{ " tasks" }</span>
      </button>
  }
}
