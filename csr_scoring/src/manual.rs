/*!

This is the long-form manual for `csr_scoring` and `csrscore`.

## Scoring rules

Each answer of the questionnaire is turned into a number:

| Answer                                   | Score |
|------------------------------------------|-------|
| an affirmative token (`Oui`, `Yes`, ...) | 1.0   |
| a negative token (`Non`, `No`, ...)      | 0.0   |
| any other text (free-form answer)        | 0.5   |
| empty cell, or missing cell              | 0.0   |

Tokens are compared after trimming and lowercasing. Each language has its own
vocabulary: `Oui` is a free-form answer for an English questionnaire.

A **pillar** (governance, human rights, health and safety, ...) groups several
questions. Its score is the mean of the scores of its questions, times 100, rounded
to one decimal.

The **global score** is the weighted sum of the pillar scores, rounded to one decimal.
When a value falls exactly halfway, it is rounded to the even digit: 6.25 gives 6.2.
The weights of the pillars must sum to 1.

The **level** of a respondent follows the global score:
* `green` from 67
* `amber` from 34 and below 67
* `red` below 34

The **strengths** are the pillars scoring 80 or more, the **weaknesses** the pillars
scoring strictly less than 50.

The **recommendations** are evaluated in the order of the configuration. A
recommendation is made when its question was answered negatively or not at all
(free-form answers do not trigger it). At most 5 recommendations are kept.

## Collective statistics

Across all the respondents:
* `avgScore`: the mean of the global scores
* `avgByPillar`: the mean of each pillar score
* `countGreen`, `countAmber`, `countRed`: the number of respondents at each level
* `topPillar`, `weakPillar`: the pillars with the highest and lowest means. In case
  of a tie, the first pillar in the configuration is chosen.

Without any respondent, the collective statistics are `null`.

## Configuration file

The command line program `csrscore` reads a JSON configuration:

```json
{
  "outputSettings": {
    "dashboardName": "Supplier CSR survey",
    "outputPath": "public/data.json"
  },
  "pillars": [
    { "name": "governance", "label": "CSR Governance", "weight": 0.6 },
    { "name": "environment", "label": "Environment", "weight": 0.4 }
  ],
  "languages": [
    {
      "language": "en",
      "provider": "csv",
      "filePath": "responses_en.csv",
      "vocabulary": { "affirmative": ["yes"], "negative": ["no"] },
      "columns": { "governance": [9, 10], "environment": ["L", "M"] },
      "metadata": { "timestamp": 0, "email": 1, "name": 2 },
      "recommendations": [
        { "column": 10, "text": "Publish an annual CSR report" }
      ]
    }
  ]
}
```

The metadata fields are copied to the records. They cannot be named like the
keys of a record (`id`, `respondedAt`, `language`, `scoreGlobal`, ...).

Columns are 0-based. They can also be given with the letters of the spreadsheet
(`"A"` is 0, `"Z"` is 25, `"AA"` is 26).

The following providers are supported:
* `csv` Comma Separated Values, as exported by Google Sheets or Excel.
* `xlsx` Excel files. If the workbook has more than one worksheet, the
  `excelWorksheetName` option selects the one to read.

In both cases, the first row is the header and is skipped. Blank rows and rows
without a name are skipped as well.

The configuration is checked before reading any response. The program stops with an
error if, for instance, the weights do not sum to 1 or a pillar has no question in
one of the languages.

## Output

The output is a single JSON document:

```json
{
  "meta": {
    "dashboardName": "Supplier CSR survey",
    "lastUpdated": "...",
    "totalResponded": 2,
    "perLanguageCounts": { "en": 2 },
    "pillarLabels": { "governance": "CSR Governance", "environment": "Environment" }
  },
  "collective": { "avgScore": 50.0, "...": "..." },
  "suppliers": [ { "id": "acme", "scoreGlobal": 80.0, "...": "..." } ]
}
```

The suppliers are sorted by decreasing global score. Suppliers with the same score
keep the order in which they were read.
*/
