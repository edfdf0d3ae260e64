/*!

This is the long-form manual for `consensus_ranking` and `conrank`.

## What is computed

Several experts rank the same set of items. The consensus ranking is a ranking of all
the items that is as close as possible to the rankings of the experts. Two distances
between rankings are used:

* the **rank distance** is the sum over all the items of the absolute difference of
  their ranks. An item that an expert did not rank gets the rank `n + 1`.
* the **Hamming distance** is the number of ordered pairs `(a, b)` ("a comes before b")
  that one ranking contains and the other does not. An expert who did not rank an item
  says nothing about the pairs of this item.

Four criteria combine the distances to the experts:

| key          | criterion                                   | also known as |
|--------------|---------------------------------------------|---------------|
| `k1_rank`    | weighted sum of the rank distances          | Cook median   |
| `k2_rank`    | largest rank distance                       | GV median     |
| `k1_hamming` | weighted sum of the Hamming distances       | Kemeny median |
| `k2_hamming` | largest Hamming distance                    | minimax       |

Note that the weights of the experts only apply to the sums: the largest distance is
taken over the unweighted distances.

The search visits every permutation of the items, in lexicographic order of their
position in the item list. All the rankings that reach the optimal value of a criterion
are reported, not only the first one. With `n` items, there are `n!` permutations:
runs above 9 or 10 items become slow. The `limitObjects` option keeps only the first
items.

## Competence

For a given ranking, the competence of each expert is `1 / (1 + d)` where `d` is the
rank distance of the expert to this ranking, normalized so that the competences of all
the experts sum to 1. It is reported for every optimal ranking, and at the top level
for the reference ranking: the first optimal ranking of `k1_rank`.

## Configuration

`conrank` reads a JSON file:

```text
{
  "outputSettings": { "runName": "F1 teams", "outputPath": "result.jsonl" },
  "items": [ { "id": 1, "name": "Mercedes" }, { "id": 2, "name": "Ferrari" } ],
  "experts": [
    { "id": "1", "name": "Anna", "rankings": [ [2, 1] ] },
    { "id": "2", "name": "Bob", "rankings": [ [1, 2], [2, 1] ] }
  ],
  "weights": { "2": 1.5 },
  "rules": {
    "limitObjects": 8,
    "progressEvery": 2000,
    "progressIntervalMs": 200,
    "maxTiesPerCriterion": 100
  }
}
```

- `rankings` is the history of the expert, oldest first. Only the last ranking is used.
  Experts without ranking are skipped. Item ids that are not in the item list are ignored.
- `weights` (optional) overrides the default weight of 1 per expert id.
- all the `rules` are optional.

## Output

The run produces a sequence of events, written one JSON object per line:

```text
{"type":"start","total":6}
{"type":"log","message":"Starting exhaustive search over 3 items (6 permutations)"}
{"type":"progress","current":2000,"total":40320,"percent":4.96}
{"type":"result","inputs":[...],"rankings":{...},"criteria":{...},...}
```

Progress is reported at most once every `progressEvery` permutations, and only if
`progressIntervalMs` milliseconds passed since the previous report.

The `result` event contains, for each criterion, the list of optimal rankings, each
with the distance of every expert (rank or Hamming distance, depending on the
criterion) and the competences computed against this ranking.

 */
